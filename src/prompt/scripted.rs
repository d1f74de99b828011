use super::{Prompter, TextQuestion};
use anyhow::{anyhow, Result};
use std::collections::VecDeque;

/// Answers prompts from a fixed script. Answers that fail validation are
/// recorded in `rejected` and the next one is tried, like a user re-typing.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub rejected: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, message: &str) -> Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("No scripted answer left for '{message}'"))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, question: &TextQuestion<'_>) -> Result<String> {
        self.asked.push(question.message.to_string());
        loop {
            let mut answer = self.next_answer(question.message)?;
            if answer.is_empty() {
                if let Some(default) = question.default {
                    answer = default.to_string();
                }
            }
            match question.validation.check(&answer) {
                Ok(()) => return Ok(answer),
                Err(_) => self.rejected.push(answer),
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[&str]) -> Result<usize> {
        self.asked.push(message.to_string());
        let answer = self.next_answer(message)?;
        choices
            .iter()
            .position(|choice| *choice == answer)
            .ok_or_else(|| anyhow!("'{answer}' is not one of {choices:?}"))
    }
}
