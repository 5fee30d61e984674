//! Console wiring and the interactive shell

use crate::prompt::{self, Echo, SharedTerminal, TerminalConfirm, CANCEL};
use crate::render;
use anyhow::{anyhow, bail, Context};
use roster_core::{
    ConsoleConfig, DeleteOutcome, ModeKind, RosterController, RosterError, StoreBackend,
    SubmitOutcome,
};
use roster_schema::{validate, Draft, Field, Gender, StudentRecord};
use roster_session::{IdentityProvider, InMemoryIdentityProvider, LoginForm, SessionGate};
use roster_store::{DocumentStore, HttpDocumentStore, InMemoryDocumentStore, RecordStoreClient};
use std::path::Path;
use std::sync::Arc;

/// Record store client for the configured backend
pub(crate) fn store_client(config: &ConsoleConfig) -> anyhow::Result<RecordStoreClient> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
        StoreBackend::Http => {
            let base_url = config
                .store
                .base_url
                .as_deref()
                .ok_or_else(|| anyhow!("store.base_url is not set"))?;
            Arc::new(HttpDocumentStore::new(base_url, config.store.collection.as_str()))
        }
    };
    tracing::info!(backend = store.name(), collection = %config.store.collection, "record store ready");
    Ok(RecordStoreClient::new(store))
}

/// Identity provider over the configured accounts, with its initial status resolved
pub(crate) fn identity_provider(config: &ConsoleConfig) -> Arc<InMemoryIdentityProvider> {
    let provider = InMemoryIdentityProvider::new(config.auth.accounts.iter().cloned());
    provider.restore();
    Arc::new(provider)
}

fn login_prefill(config: &ConsoleConfig) -> LoginForm {
    LoginForm::prefilled(
        config.auth.prefill_email.as_deref(),
        config.auth.prefill_password.as_deref(),
    )
}

/// `list`: sign in non-interactively and print the roster table
pub(crate) async fn list(
    config: &ConsoleConfig,
    email: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<String> {
    let provider = identity_provider(config);
    let prefill = login_prefill(config);
    let form = LoginForm::new(
        email.unwrap_or(&prefill.email),
        password.unwrap_or(&prefill.password),
    );
    form.submit(provider.as_ref()).await?;

    let roster = RosterController::new(store_client(config)?, SessionGate::new(provider.subscribe()));
    roster.load().await?;
    Ok(render::table(&roster.records()))
}

/// `validate`: check a JSON draft file
///
/// Returns the report and whether the draft was valid.
pub(crate) fn validate_file(path: &Path) -> anyhow::Result<(String, bool)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let draft: Draft = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object of student fields", path.display()))?;
    Ok(match validate(&draft) {
        Ok(payload) => (format!("{}: valid record for {}\n", path.display(), payload.name), true),
        Err(errors) => (
            format!(
                "{}: {} invalid field(s)\n{}",
                path.display(),
                errors.len(),
                render::field_errors(&errors)
            ),
            false,
        ),
    })
}

/// Shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    List,
    Add,
    View(String),
    Edit(String),
    Delete(String),
    Logout,
    Help,
    Quit,
}

impl Command {
    pub(crate) fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("type `help` for commands".to_string());
        };
        let arg = words.next().map(str::to_string);
        let needs_id = |make: fn(String) -> Self| {
            arg.clone()
                .map(make)
                .ok_or_else(|| format!("usage: {verb} <id>"))
        };
        match verb {
            "list" | "ls" => Ok(Self::List),
            "add" | "new" => Ok(Self::Add),
            "view" | "show" => needs_id(Self::View),
            "edit" => needs_id(Self::Edit),
            "delete" | "rm" => needs_id(Self::Delete),
            "logout" => Ok(Self::Logout),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command `{other}`; type `help`")),
        }
    }
}

const HELP: &str = "\
commands:
  list              show all students
  add               add a student
  view <id>         show one student (id prefix is enough)
  edit <id>         edit a student
  delete <id>       delete a student
  logout            sign out
  quit              leave
in forms, press enter to keep the shown value or type :cancel to abandon
";

enum Flow {
    Continue,
    SignedOut,
    Quit,
}

/// Interactive console
pub(crate) struct Shell {
    provider: Arc<InMemoryIdentityProvider>,
    roster: RosterController,
    term: SharedTerminal,
    prefill: LoginForm,
}

impl Shell {
    pub(crate) fn new(
        config: &ConsoleConfig,
        provider: Arc<InMemoryIdentityProvider>,
        client: RecordStoreClient,
        term: SharedTerminal,
    ) -> Self {
        let gate = SessionGate::new(provider.subscribe());
        Self {
            provider,
            roster: RosterController::new(client, gate),
            term,
            prefill: login_prefill(config),
        }
    }

    fn say(&self, text: &str) -> anyhow::Result<()> {
        self.term.lock().say(text)?;
        Ok(())
    }

    async fn ask(&self, question: &str) -> anyhow::Result<Option<String>> {
        Ok(prompt::read(&self.term, question, Echo::Visible).await?)
    }

    fn flush_notice(&self) -> anyhow::Result<()> {
        if let Some(notice) = self.roster.take_notice() {
            self.say(&render::notice(&notice))?;
        }
        Ok(())
    }

    /// Run until `quit` or end of input
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let mut gate = self.roster.gate().clone();
        if gate.resolved().await.is_none() {
            bail!("identity provider closed before reporting a session");
        }

        loop {
            if !self.roster.gate().is_authorized() && !self.login().await? {
                return Ok(());
            }
            self.refresh().await?;

            loop {
                if !self.roster.gate().is_authorized() {
                    self.say("Session ended; please sign in again.")?;
                    break;
                }
                let Some(line) = self.ask("roster> ").await? else {
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(usage) => {
                        self.say(&usage)?;
                        continue;
                    }
                };
                match self.dispatch(command).await? {
                    Flow::Continue => {}
                    Flow::SignedOut => break,
                    Flow::Quit => return Ok(()),
                }
            }
        }
    }

    /// Prompt for credentials until sign-in succeeds. `false` at end of input.
    async fn login(&self) -> anyhow::Result<bool> {
        self.say("Sign in to manage students.")?;
        loop {
            let Some(email) = self.ask_with_default("Email", &self.prefill.email).await? else {
                return Ok(false);
            };
            let password_prompt = if self.prefill.password.is_empty() {
                "Password: ".to_string()
            } else {
                "Password [configured]: ".to_string()
            };
            let Some(password) = prompt::read(&self.term, &password_prompt, Echo::Hidden).await? else {
                return Ok(false);
            };
            let password = if password.is_empty() {
                self.prefill.password.clone()
            } else {
                password
            };

            match LoginForm::new(email, password).submit(self.provider.as_ref()).await {
                Ok(session) => {
                    self.say(&format!("Signed in as {}.", session.email()))?;
                    return Ok(true);
                }
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    async fn ask_with_default(&self, label: &str, current: &str) -> anyhow::Result<Option<String>> {
        let prompt = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };
        Ok(self.ask(&prompt).await?.map(|answer| {
            if answer.is_empty() {
                current.to_string()
            } else {
                answer
            }
        }))
    }

    async fn refresh(&self) -> anyhow::Result<()> {
        match self.roster.load().await {
            Ok(_) => self.say(&render::table(&self.roster.records())),
            Err(RosterError::Store(_)) => {
                self.flush_notice()?;
                self.say(&render::table(&self.roster.records()))
            }
            Err(e) => self.say(&e.to_string()),
        }
    }

    fn lookup(&self, needle: &str) -> anyhow::Result<Option<StudentRecord>> {
        let found = self.roster.records().find(needle).cloned();
        if found.is_none() {
            self.say(&format!("no single student matches `{needle}`"))?;
        }
        Ok(found)
    }

    async fn dispatch(&self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::List => self.refresh().await?,
            Command::Help => self.say(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Logout => {
                self.provider.sign_out().await;
                self.say("Signed out.")?;
                return Ok(Flow::SignedOut);
            }
            Command::Add => {
                self.roster.open_create()?;
                self.fill_form().await?;
            }
            Command::View(needle) => {
                if let Some(record) = self.lookup(&needle)? {
                    self.roster.open_view(record.clone())?;
                    self.say(&render::detail(&record))?;
                    self.roster.close_modal();
                }
            }
            Command::Edit(needle) => {
                if let Some(record) = self.lookup(&needle)? {
                    self.roster.open_edit(record)?;
                    self.fill_form().await?;
                }
            }
            Command::Delete(needle) => {
                if let Some(record) = self.lookup(&needle)? {
                    self.delete(record).await?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    async fn delete(&self, record: StudentRecord) -> anyhow::Result<()> {
        let confirm = TerminalConfirm {
            term: Arc::clone(&self.term),
        };
        match self.roster.request_delete(&record.id, &confirm).await {
            Ok(DeleteOutcome::Declined) => self.say("Kept.")?,
            Ok(DeleteOutcome::Deleted { .. }) => {
                self.say(&format!("Deleted {}.", record.name()))?;
                self.flush_notice()?;
                self.say(&render::table(&self.roster.records()))?;
            }
            Err(RosterError::Store(_)) => self.flush_notice()?,
            Err(e) => self.say(&e.to_string())?,
        }
        Ok(())
    }

    /// Walk the open form field by field, submit, and re-prompt failing
    /// fields until it saves or is cancelled.
    async fn fill_form(&self) -> anyhow::Result<()> {
        let heading = match self.roster.mode() {
            ModeKind::Editing => "Edit student",
            _ => "New student",
        };
        self.say(&format!("{heading} ({CANCEL} to abandon)"))?;

        let mut pending: Vec<Field> = Field::ALL.to_vec();
        loop {
            for field in pending {
                let current = self
                    .roster
                    .draft()
                    .and_then(|d| d.get(field).map(str::to_string))
                    .unwrap_or_default();
                let label = if field == Field::Gender {
                    let options: Vec<&str> = Gender::ALL.iter().map(|g| g.as_str()).collect();
                    format!("{} ({})", field.label(), options.join("/"))
                } else {
                    field.label().to_string()
                };
                let Some(value) = self.ask_with_default(&label, &current).await? else {
                    self.roster.close_modal();
                    return Ok(());
                };
                if value.trim() == CANCEL {
                    self.roster.close_modal();
                    self.say("Cancelled.")?;
                    return Ok(());
                }
                self.roster.update_draft(field, value)?;
            }

            let draft = self
                .roster
                .draft()
                .ok_or_else(|| anyhow!("form closed while it was being filled"))?;
            match self.roster.submit(draft).await {
                Ok(SubmitOutcome::Created(record)) => {
                    self.say(&format!("Added {} ({}).", record.name(), record.id.short()))?;
                }
                Ok(SubmitOutcome::Updated(record)) => {
                    self.say(&format!("Saved {}.", record.name()))?;
                }
                Ok(SubmitOutcome::Vanished(_)) => {}
                Err(RosterError::Validation(errors)) => {
                    self.say(&render::field_errors(&errors))?;
                    pending = errors.fields().collect();
                    continue;
                }
                Err(RosterError::Store(_)) => {
                    self.flush_notice()?;
                    let retry = self.ask("Retry saving? [y/N] ").await?;
                    if matches!(retry.as_deref().map(str::trim), Some("y" | "Y")) {
                        pending = Vec::new();
                        continue;
                    }
                    self.roster.close_modal();
                    return Ok(());
                }
                Err(e) => {
                    self.say(&e.to_string())?;
                    self.roster.close_modal();
                    return Ok(());
                }
            }
            self.flush_notice()?;
            self.say(&render::table(&self.roster.records()))?;
            return Ok(());
        }
    }
}
