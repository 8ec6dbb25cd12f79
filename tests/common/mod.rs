#![allow(dead_code)] // Not every test binary uses every helper.

use async_trait::async_trait;
use deployd::confirm::Confirmation;
use deployd::platform::{OperationError, PluginPlatform, RefreshError};
use deployd::plugin::PluginRecord;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Build a managed plugin record for tests.
pub fn record(name: &str, installed_at: Option<&str>, upgrade_version: Option<&str>) -> PluginRecord {
    PluginRecord {
        name: name.to_string(),
        managed_by_composer: true,
        installed_at: installed_at.map(str::to_string),
        upgrade_version: upgrade_version.map(str::to_string),
        active: installed_at.is_some(),
    }
}

/// In-memory platform that records every call it receives.
///
/// Calls are logged as `"refresh"`, `"list"`, and `"<operation>:<name>"`.
#[derive(Default)]
pub struct MockPlatform {
    pub plugins: Vec<PluginRecord>,
    pub refresh_error: Option<String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockPlatform {
    pub fn with_plugins(plugins: Vec<PluginRecord>) -> Self {
        Self {
            plugins,
            ..Default::default()
        }
    }

    pub fn failing_refresh(reason: &str) -> Self {
        Self {
            refresh_error: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Make one lifecycle operation fail for one plugin.
    pub fn fail_on(mut self, operation: &str, name: &str) -> Self {
        self.failing.insert(format!("{operation}:{name}"));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn lifecycle(&self, operation: &'static str, name: &str) -> Result<(), OperationError> {
        let key = format!("{operation}:{name}");
        self.calls.lock().unwrap().push(key.clone());
        if self.failing.contains(&key) {
            Err(OperationError::Failed {
                plugin: name.to_string(),
                operation,
                reason: format!("{operation} blew up"),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PluginPlatform for MockPlatform {
    async fn refresh_registry(&self) -> Result<(), RefreshError> {
        self.calls.lock().unwrap().push("refresh".to_string());
        match &self.refresh_error {
            Some(reason) => Err(RefreshError::CommandFailed(reason.clone())),
            None => Ok(()),
        }
    }

    async fn list_managed_plugins(&self) -> Result<Vec<PluginRecord>, RefreshError> {
        self.calls.lock().unwrap().push("list".to_string());
        Ok(self.plugins.clone())
    }

    async fn install(&self, name: &str) -> Result<(), OperationError> {
        self.lifecycle("install", name)
    }

    async fn update(&self, name: &str) -> Result<(), OperationError> {
        self.lifecycle("update", name)
    }

    async fn activate(&self, name: &str) -> Result<(), OperationError> {
        self.lifecycle("activate", name)
    }

    async fn deactivate(&self, name: &str) -> Result<(), OperationError> {
        self.lifecycle("deactivate", name)
    }
}

/// Confirmation that replays scripted answers and records the questions.
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    fallback: bool,
    pub questions: Vec<String>,
}

impl ScriptedConfirm {
    /// Answer every question the same way.
    pub fn always(answer: bool) -> Self {
        Self {
            answers: VecDeque::new(),
            fallback: answer,
            questions: Vec::new(),
        }
    }

    /// Answer with the given sequence, declining once it runs out.
    pub fn sequence(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            fallback: false,
            questions: Vec::new(),
        }
    }
}

impl Confirmation for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(self.fallback))
    }
}
