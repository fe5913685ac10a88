//! Prompt generation aggregate.
//!
//! One instance per generation session. All state changes go through
//! [`PromptGenerationAggregate::generate_prompt`]; attempts only ever grow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::PromptTemplate,
    error::DomainError,
    value_objects::{SubstitutionPolicy, TemplatePath, TemplateVariables, VariableSubstitution},
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Initialized,
    Generating,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPrompt {
    pub id: Uuid,
    pub template_path: TemplatePath,
    pub content: String,
    pub variables: TemplateVariables,
    pub attempt: u32,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationState {
    status: GenerationStatus,
    attempts: u32,
    errors: Vec<DomainError>,
    last_generated: Option<GeneratedPrompt>,
}

impl GenerationState {
    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn errors(&self) -> &[DomainError] {
        &self.errors
    }

    pub fn last_generated(&self) -> Option<&GeneratedPrompt> {
        self.last_generated.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct PromptGenerationAggregate {
    id: String,
    template: PromptTemplate,
    substitution: VariableSubstitution,
    max_attempts: u32,
    state: GenerationState,
}

impl PromptGenerationAggregate {
    /// # Errors
    ///
    /// `EmptyId` if `id` is blank.
    pub fn create(id: impl Into<String>, template: PromptTemplate) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(Self {
            id,
            template,
            substitution: VariableSubstitution::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            state: GenerationState::default(),
        })
    }

    pub fn with_policy(mut self, policy: SubstitutionPolicy) -> Self {
        self.substitution = VariableSubstitution::new(policy);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Render the template with `variables`.
    ///
    /// Every call counts as an attempt. A failure is recorded in the state
    /// and returned; a success replaces `last_generated`. This does not
    /// consult [`can_retry`](Self::can_retry); callers decide.
    pub fn generate_prompt(
        &mut self,
        variables: &TemplateVariables,
    ) -> Result<GeneratedPrompt, DomainError> {
        self.state.status = GenerationStatus::Generating;
        self.state.attempts += 1;

        match self.substitution.apply(self.template.content(), variables) {
            Ok(content) => {
                let prompt = GeneratedPrompt {
                    id: Uuid::new_v4(),
                    template_path: self.template.path().clone(),
                    content,
                    variables: variables.clone(),
                    attempt: self.state.attempts,
                    generated_at: Utc::now(),
                };
                self.state.status = GenerationStatus::Completed;
                self.state.last_generated = Some(prompt.clone());
                Ok(prompt)
            }
            Err(e) => {
                self.state.status = GenerationStatus::Failed;
                self.state.errors.push(e.clone());
                Err(e)
            }
        }
    }

    pub fn can_retry(&self) -> bool {
        self.state.status != GenerationStatus::Completed
            && self.state.attempts < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::TemplateContent;

    fn aggregate(text: &str) -> PromptGenerationAggregate {
        let template = PromptTemplate::new(
            TemplatePath::create("to", "task", "f_task.md").unwrap(),
            TemplateContent::create(text).unwrap(),
        );
        PromptGenerationAggregate::create("id1", template).unwrap()
    }

    #[test]
    fn blank_id_is_rejected() {
        let template = aggregate("x").template().clone();
        assert_eq!(
            PromptGenerationAggregate::create(" ", template).unwrap_err(),
            DomainError::EmptyId
        );
    }

    #[test]
    fn starts_initialized() {
        let agg = aggregate("Hello {name}");
        assert_eq!(agg.state().status(), GenerationStatus::Initialized);
        assert_eq!(agg.state().attempts(), 0);
        assert!(agg.can_retry());
    }

    #[test]
    fn failure_then_exhaustion_then_success() {
        let mut agg = aggregate("Hello {name}");

        let err = agg.generate_prompt(&TemplateVariables::new()).unwrap_err();
        assert!(matches!(err, DomainError::MissingVariables { .. }));
        assert_eq!(agg.state().status(), GenerationStatus::Failed);
        assert_eq!(agg.state().attempts(), 1);
        assert!(agg.can_retry());

        agg.generate_prompt(&TemplateVariables::new()).unwrap_err();
        agg.generate_prompt(&TemplateVariables::new()).unwrap_err();
        assert_eq!(agg.state().errors().len(), 3);
        assert!(!agg.can_retry());

        let vars = TemplateVariables::new().with("name", "X").unwrap();
        let prompt = agg.generate_prompt(&vars).unwrap();
        assert_eq!(prompt.content, "Hello X");
        assert_eq!(prompt.attempt, 4);
        assert_eq!(agg.state().status(), GenerationStatus::Completed);
        assert_eq!(agg.state().last_generated(), Some(&prompt));
        assert!(!agg.can_retry());
    }

    #[test]
    fn policy_is_applied() {
        let mut agg = aggregate("a={a} b={b}").with_policy(SubstitutionPolicy::Empty);
        let vars = TemplateVariables::new().with("a", "1").unwrap();
        assert_eq!(agg.generate_prompt(&vars).unwrap().content, "a=1 b=");
    }

    #[test]
    fn prompt_ids_are_unique() {
        let mut agg = aggregate("static");
        let a = agg.generate_prompt(&TemplateVariables::new()).unwrap();
        let b = agg.generate_prompt(&TemplateVariables::new()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn custom_attempt_budget() {
        let mut agg = aggregate("{x}").with_max_attempts(1);
        agg.generate_prompt(&TemplateVariables::new()).unwrap_err();
        assert!(!agg.can_retry());
    }
}
