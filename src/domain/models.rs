//! Catalog of selectable completion models.

/// Model used when the presentation layer has not selected one.
pub const DEFAULT_MODEL: &str = "sonar";

/// Models offered in the model selector.
pub const AVAILABLE_MODELS: &[&str] = &[
    "sonar",
    "sonar-pro",
    "sonar-reasoning",
    "sonar-reasoning-pro",
    "sonar-deep-research",
];

/// Returns true if `model` is one of the catalog models.
pub fn is_known_model(model: &str) -> bool {
    AVAILABLE_MODELS.contains(&model)
}
