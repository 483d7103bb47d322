use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::application::categories::{CategoryPatch, CreateCategoryCommand};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "parentCategory")]
    pub parent_id: Option<Uuid>,
}

impl From<CreateCategoryRequest> for CreateCategoryCommand {
    fn from(request: CreateCategoryRequest) -> Self {
        Self {
            name: request.name,
            parent_id: request.parent_id,
        }
    }
}

/// Partial update body. An explicit `"parentId": null` detaches the category
/// to the root; omitting the field leaves the parent unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "parentCategory",
        deserialize_with = "present_or_null"
    )]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<UpdateCategoryRequest> for CategoryPatch {
    fn from(request: UpdateCategoryRequest) -> Self {
        Self {
            name: request.name,
            parent_id: request.parent_id,
            is_active: request.is_active,
        }
    }
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_accepts_parent_category_alias() {
        let parent = Uuid::new_v4();
        let request: CreateCategoryRequest =
            serde_json::from_value(json!({ "name": "GPUs", "parentCategory": parent }))
                .expect("deserialize");
        assert_eq!(request.parent_id, Some(parent));
    }

    #[test]
    fn update_distinguishes_null_parent_from_missing() {
        let detach: UpdateCategoryRequest =
            serde_json::from_value(json!({ "parentId": null })).expect("deserialize");
        assert_eq!(detach.parent_id, Some(None));

        let untouched: UpdateCategoryRequest =
            serde_json::from_value(json!({ "name": "Storage" })).expect("deserialize");
        assert_eq!(untouched.parent_id, None);
        assert_eq!(untouched.name.as_deref(), Some("Storage"));
    }

    #[test]
    fn empty_update_body_yields_empty_patch() {
        let request: UpdateCategoryRequest =
            serde_json::from_value(json!({})).expect("deserialize");
        assert!(CategoryPatch::from(request).is_empty());
    }
}
