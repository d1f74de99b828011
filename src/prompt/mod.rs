mod collector;
#[cfg(test)]
pub mod scripted;

pub use collector::{collect, CollectionChoice, MediaChoice, Preferences};

use crate::utils;
use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Select};

/// Rule an answer must satisfy before the collector moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    None,
    Url,
    /// Digits only, value at least `min`.
    Index { min: u32 },
    /// Comma-separated indices, each at least 1.
    IndexList,
}

impl Validation {
    pub fn check(&self, input: &str) -> Result<(), String> {
        match self {
            Validation::None => Ok(()),
            Validation::Url => {
                if utils::is_supported_url(input) {
                    Ok(())
                } else {
                    Err("Please enter a valid YouTube URL".to_string())
                }
            }
            Validation::Index { min } => check_index(input, *min).map(|_| ()),
            Validation::IndexList => {
                let tokens: Vec<&str> = input
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect();
                if tokens.is_empty() {
                    return Err("Enter at least one video number".to_string());
                }
                tokens
                    .into_iter()
                    .try_for_each(|token| check_index(token, 1).map(|_| ()))
            }
        }
    }
}

fn check_index(input: &str, min: u32) -> Result<u32, String> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err("Please enter digits only".to_string());
    }
    let value: u32 = input
        .parse()
        .map_err(|_| "That number is too large".to_string())?;
    if value < min {
        return Err(format!("Please enter a number of at least {min}"));
    }
    Ok(value)
}

pub struct TextQuestion<'a> {
    pub message: &'a str,
    pub default: Option<&'a str>,
    pub validation: Validation,
}

impl<'a> TextQuestion<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            default: None,
            validation: Validation::None,
        }
    }

    pub fn with_default(mut self, default: &'a str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }
}

/// Source of interactive answers.
///
/// Implementations keep asking until `question.validation` passes.
pub trait Prompter {
    fn text(&mut self, question: &TextQuestion<'_>) -> Result<String>;

    /// Returns the index of the chosen entry in `choices`.
    fn select(&mut self, message: &str, choices: &[&str]) -> Result<usize>;
}

/// True for `y` or `yes` in any case.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&mut self, question: &TextQuestion<'_>) -> Result<String> {
        let validation = question.validation;
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(question.message)
            .allow_empty(validation == Validation::None);

        if let Some(default) = question.default {
            input = input.default(default.to_string());
        }

        input
            .validate_with(move |value: &String| validation.check(value))
            .interact_text()
            .with_context(|| format!("Failed to read answer to '{}'", question.message))
    }

    fn select(&mut self, message: &str, choices: &[&str]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(choices)
            .default(0)
            .interact()
            .with_context(|| format!("Failed to read answer to '{message}'"))
    }
}
