use crate::{ResultEngine, categories};

use super::{Engine, normalize_required_name};

impl Engine {
    pub async fn create_category(&self, name: &str) -> ResultEngine<categories::Model> {
        let name = normalize_required_name(name, "category name")?;
        self.queries().create_category(&name).await
    }

    /// All group categories, in creation order.
    pub async fn list_categories(&self) -> ResultEngine<Vec<categories::Model>> {
        self.queries().list_categories().await
    }
}
