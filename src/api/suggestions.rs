//! Transfer suggestion endpoint

use super::models::{GenerateSuggestions, GeneratedSuggestions};
use super::FplApi;
use crate::gateway::ApiError;

impl FplApi {
    /// Asks the server to score transfers for a loaded team
    ///
    /// Generation is a write on the server and is never cached.
    pub async fn generate_suggestions(
        &self,
        request: &GenerateSuggestions,
    ) -> Result<GeneratedSuggestions, ApiError> {
        self.post_json("suggestions/generate", request).await
    }
}
