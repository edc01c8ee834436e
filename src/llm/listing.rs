use tracing::debug;

use crate::llm::service::{GENERATE_CONTENT, GenerativeService, ModelDescriptor};

/// Models advertised by the first API version that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedModels {
    pub api_version: String,
    pub models: Vec<ModelDescriptor>,
}

/// Asks each version in order for its model list and returns the
/// `generateContent`-capable subset of the first non-empty answer.
///
/// Per-version failures are swallowed; results are never merged across
/// versions.
pub async fn list_usable_models<S: GenerativeService>(
    service: &S,
    api_versions: &[String],
) -> Option<ListedModels> {
    for version in api_versions {
        let models = match service.list_models(version).await {
            Ok(models) => models,
            Err(err) => {
                debug!(api_version = %version, error = %err, "model listing failed");
                continue;
            }
        };

        let usable: Vec<ModelDescriptor> = models
            .into_iter()
            .filter(|model| model.supports(GENERATE_CONTENT))
            .collect();
        if usable.is_empty() {
            debug!(api_version = %version, "no generateContent models listed");
            continue;
        }

        return Some(ListedModels {
            api_version: version.clone(),
            models: usable,
        });
    }
    None
}

/// Orders discovered models so names containing `prefer_tag` come first,
/// keeping listing order otherwise, then keeps at most `limit`.
pub fn rank_models(
    mut models: Vec<ModelDescriptor>,
    prefer_tag: Option<&str>,
    limit: usize,
) -> Vec<ModelDescriptor> {
    if let Some(tag) = prefer_tag.filter(|tag| !tag.is_empty()) {
        models.sort_by_key(|model| !model.name.contains(tag));
    }
    models.truncate(limit);
    models
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedService;

    fn versions() -> Vec<String> {
        vec!["v1".to_string(), "v1beta".to_string()]
    }

    #[tokio::test]
    async fn first_failing_version_is_skipped() {
        let service = ScriptedService::new().listing(
            "v1beta",
            vec![
                ModelDescriptor::new("models/gemini-x", &[GENERATE_CONTENT]),
                ModelDescriptor::new("models/embedder", &["embedContent"]),
            ],
        );

        let listed = list_usable_models(&service, &versions())
            .await
            .expect("v1beta should answer");

        assert_eq!(listed.api_version, "v1beta");
        assert_eq!(names(&listed.models), ["models/gemini-x"]);
        assert_eq!(service.list_calls(), ["v1", "v1beta"]);
    }

    #[tokio::test]
    async fn results_are_not_merged_across_versions() {
        let service = ScriptedService::new()
            .listing("v1", vec![ModelDescriptor::new("models/a", &[GENERATE_CONTENT])])
            .listing("v1beta", vec![ModelDescriptor::new("models/b", &[GENERATE_CONTENT])]);

        let listed = list_usable_models(&service, &versions())
            .await
            .expect("v1 should answer");

        assert_eq!(listed.api_version, "v1");
        assert_eq!(names(&listed.models), ["models/a"]);
        assert_eq!(service.list_calls(), ["v1"]);
    }

    #[tokio::test]
    async fn total_failure_yields_none() {
        let service = ScriptedService::new()
            .listing("v1", vec![ModelDescriptor::new("models/e", &["embedContent"])]);

        assert_eq!(list_usable_models(&service, &versions()).await, None);
        assert_eq!(service.list_calls(), ["v1", "v1beta"]);
    }

    fn names(models: &[ModelDescriptor]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn rank_prefers_tagged_names_and_keeps_order() {
        let models = vec![
            ModelDescriptor::new("models/gemini-pro", &[GENERATE_CONTENT]),
            ModelDescriptor::new("models/gemini-1.5-flash", &[GENERATE_CONTENT]),
            ModelDescriptor::new("models/text-bison", &[GENERATE_CONTENT]),
            ModelDescriptor::new("models/gemini-1.5-pro", &[GENERATE_CONTENT]),
        ];
        let ranked = rank_models(models, Some("1.5"), 6);
        assert_eq!(
            names(&ranked),
            [
                "models/gemini-1.5-flash",
                "models/gemini-1.5-pro",
                "models/gemini-pro",
                "models/text-bison"
            ]
        );
    }

    #[test]
    fn rank_truncates_to_limit() {
        let models: Vec<ModelDescriptor> = (0..10)
            .map(|i| ModelDescriptor::new(format!("models/m{i}"), &[GENERATE_CONTENT]))
            .collect();
        let ranked = rank_models(models, Some("2.0"), 6);
        assert_eq!(ranked.len(), 6);
        assert_eq!(ranked[0].name, "models/m0");
    }

    #[test]
    fn rank_without_tag_keeps_listing_order() {
        let models = vec![
            ModelDescriptor::new("models/b", &[]),
            ModelDescriptor::new("models/a-1.5", &[]),
        ];
        assert_eq!(names(&rank_models(models, None, 6)), ["models/b", "models/a-1.5"]);
    }
}
