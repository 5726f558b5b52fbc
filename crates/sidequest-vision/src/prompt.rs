//! Prompt template loading and rendering via `minijinja`.
//!
//! Templates are loaded from the filesystem (default: `templates/`
//! directory) so the game-master persona can be tuned without recompiling.
//! Two templates make up one producer call: `system.j2` establishes the
//! RPG game-master rules, and `observation.j2` replays the rolling history
//! window plus the latest scene description.

use minijinja::Environment;
use sidequest_types::Observation;

use crate::error::VisionError;

/// Manages prompt template loading and rendering.
///
/// Wraps a `minijinja` [`Environment`] with the observation prompt
/// templates pre-loaded. Templates can be edited on disk and will be
/// picked up on the next call to [`PromptEngine::new`].
pub struct PromptEngine {
    env: Environment<'static>,
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message establishing the game-master persona and rules.
    pub system: String,
    /// User message containing recent history and the latest observation.
    pub user: String,
}

impl PromptEngine {
    /// Create a new prompt engine loading templates from the given
    /// directory.
    ///
    /// The directory must contain `system.j2` and `observation.j2`.
    pub fn new(templates_dir: &str) -> Result<Self, VisionError> {
        let mut env = Environment::new();

        let system_tpl = load_template(templates_dir, "system.j2")?;
        let observation_tpl = load_template(templates_dir, "observation.j2")?;

        env.add_template_owned("system", system_tpl)
            .map_err(|e| VisionError::Template(format!("failed to add system template: {e}")))?;
        env.add_template_owned("observation", observation_tpl).map_err(|e| {
            VisionError::Template(format!("failed to add observation template: {e}"))
        })?;

        Ok(Self { env })
    }

    /// Create a prompt engine from the templates compiled into the binary.
    ///
    /// Fallback for when no templates directory is deployed alongside the
    /// server; the embedded copies match `templates/` in the repository.
    pub fn builtin() -> Self {
        let mut env = Environment::new();
        // Adding a template that was valid at compile time cannot fail at
        // runtime, but the error path stays total anyway.
        if let Err(e) =
            env.add_template("system", include_str!("../../../templates/system.j2"))
        {
            tracing::error!(error = %e, "embedded system template rejected");
        }
        if let Err(e) =
            env.add_template("observation", include_str!("../../../templates/observation.j2"))
        {
            tracing::error!(error = %e, "embedded observation template rejected");
        }
        Self { env }
    }

    /// Render the full prompt for one observation cycle.
    ///
    /// `history` is the rolling window of prior observations (oldest
    /// first); `latest` is the description being classified this cycle.
    pub fn render(
        &self,
        history: &[&Observation],
        latest: &str,
    ) -> Result<RenderedPrompt, VisionError> {
        let context = minijinja::context! {
            history => history
                .iter()
                .map(|o| o.description.as_str())
                .collect::<Vec<_>>(),
            latest => latest,
        };

        let system = self
            .env
            .get_template("system")
            .map_err(|e| VisionError::Template(format!("missing system template: {e}")))?
            .render(&context)
            .map_err(|e| VisionError::Template(format!("system render failed: {e}")))?;

        let user = self
            .env
            .get_template("observation")
            .map_err(|e| VisionError::Template(format!("missing observation template: {e}")))?
            .render(&context)
            .map_err(|e| VisionError::Template(format!("observation render failed: {e}")))?;

        Ok(RenderedPrompt { system, user })
    }
}

/// Read a template file from the templates directory.
fn load_template(dir: &str, name: &str) -> Result<String, VisionError> {
    let path = std::path::Path::new(dir).join(name);
    std::fs::read_to_string(&path).map_err(|e| {
        VisionError::Template(format!("failed to read {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use sidequest_types::DangerLevel;

    use super::*;

    fn engine_with(system: &str, observation: &str) -> Option<PromptEngine> {
        let mut env = Environment::new();
        env.add_template_owned("system", system.to_owned()).ok()?;
        env.add_template_owned("observation", observation.to_owned())
            .ok()?;
        Some(PromptEngine { env })
    }

    #[test]
    fn render_includes_history_and_latest() {
        let engine = engine_with(
            "game master",
            "{% for desc in history %}[{{ loop.index0 }}] {{ desc }}\n{% endfor %}Latest: {{ latest }}",
        );
        assert!(engine.is_some());
        let Some(engine) = engine else { return };

        let older = Observation::now("a quiet plaza", DangerLevel::None);
        let newer = Observation::now("a crowd gathering", DangerLevel::Low);
        let history = vec![&older, &newer];

        let rendered = engine.render(&history, "someone shouting");
        assert!(rendered.is_ok());
        let Ok(prompt) = rendered else { return };

        assert_eq!(prompt.system, "game master");
        assert!(prompt.user.contains("[0] a quiet plaza"));
        assert!(prompt.user.contains("[1] a crowd gathering"));
        assert!(prompt.user.contains("Latest: someone shouting"));
    }

    #[test]
    fn render_with_empty_history() {
        let engine = engine_with(
            "system",
            "{% for desc in history %}[{{ loop.index0 }}] {{ desc }}\n{% endfor %}Latest: {{ latest }}",
        );
        assert!(engine.is_some());
        let Some(engine) = engine else { return };

        let rendered = engine.render(&[], "first frame");
        assert!(rendered.is_ok_and(|p| p.user.trim() == "Latest: first frame"));
    }

    #[test]
    fn missing_templates_dir_errors() {
        let engine = PromptEngine::new("/nonexistent/templates");
        assert!(engine.is_err());
    }

    #[test]
    fn builtin_templates_render() {
        let engine = PromptEngine::builtin();
        let observation = Observation::now("a sealed coffee bar", DangerLevel::None);
        let rendered = engine.render(&[&observation], "a person approaches");

        assert!(rendered.as_ref().is_ok_and(|p| p.system.contains("game master")));
        assert!(rendered.is_ok_and(
            |p| p.user.contains("a sealed coffee bar") && p.user.contains("a person approaches")
        ));
    }
}
