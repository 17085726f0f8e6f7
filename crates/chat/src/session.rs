//! A single conversation: slash commands, language tracking, memory and
//! routing through [`AiRouter`].

use std::sync::Arc;

use {
    chrono::{Datelike, Local, NaiveDateTime},
    jarvis_agents::{AiRouter, ChatMessage, ModeManager, RouterError, prompt::build_system_prompt},
    jarvis_config::{Capabilities, JarvisConfig},
    tracing::{debug, info, warn},
};

use crate::{
    commands::{self, Command, HELP},
    language::{Language, LanguageDetector},
    memory::{MemoryEntry, MemoryManager},
    planner::{Planner, short_id},
    reminders,
    render,
    schedule::Schedule,
    study::{self, FocusState, StudyTracker},
};

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Model tier used for homework help, whatever the current mode.
const HOMEWORK_HELP_TIER: &str = "pro";

/// Number of past exchanges recalled into the system prompt.
const RECALL_LIMIT: usize = 3;

/// Human-readable message for a routing failure, with a hint on what to do.
#[must_use]
pub fn describe_error(err: &RouterError) -> String {
    match err {
        RouterError::InvalidProvider { name, available } => format!(
            "Unknown provider '{name}'. Available providers: {}.",
            available.join(", ")
        ),
        RouterError::ProviderUnavailable { provider } => format!(
            "Provider '{provider}' has no API key. Set its key (e.g. {}_API_KEY) or type /auto \
             to return to automatic selection.",
            provider.to_uppercase()
        ),
        RouterError::NoModelForMode { mode, providers } => format!(
            "No model is configured for mode '{mode}' (checked: {}). Pick one with /model \
             <name> or switch modes.",
            providers.join(", ")
        ),
        RouterError::ProviderCallFailed {
            provider,
            model,
            source,
        } => format!(
            "Provider '{provider}' failed with model '{model}': {source}. Try again, pick \
             another model with /model, or type /auto to allow fallback."
        ),
        RouterError::AllProvidersFailed { source, .. } => format!(
            "No AI provider answered. Check your API keys and network connection. Last error: \
             {source}"
        ),
        RouterError::NoProvidersConfigured => "No API keys found. Set at least one of \
                                               GEMINI_API_KEY_1, DEEPSEEK_API_KEY, \
                                               OPENROUTER_API_KEY, GROQ_API_KEY or \
                                               HUGGINGFACE_API_KEY."
            .to_string(),
    }
}

/// Conversation state owned by one user.
pub struct ChatSession {
    router: AiRouter,
    modes: ModeManager,
    language: LanguageDetector,
    memory: MemoryManager,
    capabilities: Capabilities,
    default_mode: String,
    temperature: f32,
    max_tokens: u32,
    planner: Planner,
    schedule: Schedule,
    study: StudyTracker,
    clock: Clock,
}

impl ChatSession {
    pub fn new(router: AiRouter, config: &JarvisConfig, capabilities: Capabilities) -> Self {
        let modes = ModeManager::new(&config.chat.default_mode);
        let language = LanguageDetector::new(
            Language::from_code(&config.chat.language).unwrap_or(Language::Uzbek),
        );
        info!(
            mode = modes.current().name,
            language = %language.current(),
            providers = ?router.list_available_providers(),
            "chat session started"
        );
        Self {
            default_mode: modes.current().name.to_string(),
            router,
            modes,
            language,
            memory: MemoryManager::new(&config.memory),
            capabilities,
            temperature: config.router.temperature,
            max_tokens: config.router.max_tokens,
            planner: Planner::new(),
            schedule: Schedule::new(),
            study: StudyTracker::new(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the wall clock used by the planner, reminders and timers.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    #[must_use]
    pub fn router(&self) -> &AiRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut AiRouter {
        &mut self.router
    }

    #[must_use]
    pub fn modes(&self) -> &ModeManager {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeManager {
        &mut self.modes
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    #[must_use]
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Handle one line of user input and return the text to show.
    ///
    /// A focus timer that ran out since the previous input is announced
    /// ahead of the reply.
    pub async fn process(&mut self, input: &str) -> String {
        let input = input.trim();
        if input.is_empty() {
            return String::new();
        }

        let now = self.now();
        let notice = match self.study.check_focus(now) {
            FocusState::Finished { minutes } => Some(format!(
                "Focus session of {minutes} min finished. Take a 5 minute break, then /focus \
                 again."
            )),
            FocusState::Inactive | FocusState::Running { .. } => None,
        };

        let reply = match commands::parse(input) {
            Some(Ok(command)) => self.run_command(command).await,
            Some(Err(e)) => e.to_string(),
            None => match self.send(input).await {
                Ok(text) => text,
                Err(e) => describe_error(&e),
            },
        };
        match notice {
            Some(notice) => format!("{notice}\n\n{reply}"),
            None => reply,
        }
    }

    async fn run_command(&mut self, command: Command) -> String {
        debug!(?command, "slash command");
        let now = self.now();
        let today = now.date();
        match command {
            Command::SwitchMode(name) => self.switch_mode(&name),
            Command::DefaultMode => {
                let name = self.default_mode.clone();
                self.switch_mode(&name)
            },
            Command::Modes => render::mode_listing(&self.modes),
            Command::Provider(name) => match self.router.set_provider(&name) {
                Ok(()) => format!("Provider selected: {name}. Type /auto to return to automatic selection."),
                Err(e) => describe_error(&e),
            },
            Command::Providers => render::provider_status(&self.router),
            Command::Model(name) => {
                self.router.set_model(&name);
                format!("Model selected: {name}. Type /auto to return to automatic selection.")
            },
            Command::Models => render::model_listing(&self.router),
            Command::Auto => {
                self.router.reset_auto();
                "Automatic mode restored: provider and model are chosen automatically.".to_string()
            },
            Command::Status => self.status(),
            Command::Clear => {
                self.memory.clear_short_term();
                "Conversation history cleared.".to_string()
            },
            Command::Help => help_text(),
            Command::AddHomework {
                subject,
                description,
                deadline,
                priority,
            } => {
                let hw = self
                    .planner
                    .add_homework(&subject, &description, deadline, priority, today);
                info!(subject = %hw.subject, "homework added");
                format!("Homework added: {} [{}]", hw.subject, short_id(&hw.id))
            },
            Command::DoneHomework(id) => match self.planner.complete_homework(&id) {
                Ok(hw) => format!("Homework done: {}: {}", hw.subject, hw.description),
                Err(e) => e.to_string(),
            },
            Command::Homework(None) => {
                render::homework_listing("Pending homework", self.planner.pending_homework(), now)
            },
            Command::Homework(Some(subject)) => render::homework_listing(
                &format!("Homework for {subject}"),
                self.planner.homework_by_subject(&subject),
                now,
            ),
            Command::AddTask {
                title,
                description,
                deadline,
                priority,
                category,
            } => {
                let task = self
                    .planner
                    .add_task(&title, &description, deadline, priority, &category);
                format!("Task added: {} [{}]", task.title, short_id(&task.id))
            },
            Command::DoneTask(id) => match self.planner.complete_task(&id) {
                Ok(task) => format!("Task done: {}", task.title),
                Err(e) => e.to_string(),
            },
            Command::Tasks => render::pending_listing(&self.planner.all_pending()),
            Command::AddClass {
                name,
                day,
                start,
                end,
                location,
                teacher,
            } => match self
                .schedule
                .add_class(&name, day, start, end, &location, &teacher)
            {
                Ok(class) => format!("Class added: {} [{}]", class.line(), short_id(&class.id)),
                Err(e) => e.to_string(),
            },
            Command::RemoveClass(id) => match self.schedule.remove_class(&id) {
                Ok(class) => format!("Class removed: {}", class.name),
                Err(e) => e.to_string(),
            },
            Command::Schedule(day) => {
                let day = day.unwrap_or_else(|| today.weekday());
                render::class_listing(day, &self.schedule.day(day))
            },
            Command::Week => render::week_listing(&self.schedule),
            Command::Reminders => {
                reminders::format(&reminders::check_all(&self.schedule, &self.planner, now))
            },
            Command::Today => render::today_overview(now, &self.schedule, &self.planner, &self.study),
            Command::Stats => render::planner_stats(
                &self.planner.stats(today),
                &self.planner.overload_warnings(today),
            ),
            Command::StudyStart(subject) => {
                let previous = self.study.start_session(&subject, now);
                let subject = self.study.active_subject().unwrap_or(study::DEFAULT_SUBJECT);
                let started = format!("Study session started: {subject}.");
                match previous {
                    Some(p) => format!(
                        "Ended {} after {} min. {started}",
                        p.subject,
                        p.minutes()
                    ),
                    None => started,
                }
            },
            Command::StudyEnd => match self.study.end_session(now) {
                Ok(session) => format!(
                    "Study session ended: {}, {} min.",
                    session.subject,
                    session.minutes()
                ),
                Err(e) => e.to_string(),
            },
            Command::StudyStats => render::study_stats(&self.study.stats()),
            Command::Focus(minutes) => {
                self.study.start_focus(minutes, now);
                self.modes.set_mode("focus");
                format!(
                    "Focus started: {minutes} min. Mode changed: {}",
                    self.modes.current().display_name
                )
            },
            Command::FocusStop => match self.study.stop_focus(now) {
                Some(minutes) => format!("Focus stopped after {minutes} min."),
                None => "Focus timer is not running.".to_string(),
            },
            Command::HomeworkHelp {
                subject,
                description,
            } => self.homework_help(&subject, &description).await,
        }
    }

    /// Ask for structured help with one homework item, answered in the pro
    /// tier under the current mode's prompt. Not recorded in the history.
    async fn homework_help(&self, subject: &str, description: &str) -> String {
        let system = build_system_prompt(self.modes.current(), self.language.instruction(), &[]);
        let messages = [
            ChatMessage::system(system),
            ChatMessage::user(study::homework_help_prompt(subject, description)),
        ];
        match self
            .router
            .route_request(
                &messages,
                HOMEWORK_HELP_TIER,
                None,
                self.temperature,
                self.max_tokens,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(subject, error = %e, "homework help failed");
                describe_error(&e)
            },
        }
    }

    fn switch_mode(&mut self, name: &str) -> String {
        if self.modes.set_mode(name) {
            format!("Mode changed: {}", self.modes.current().display_name)
        } else {
            format!("Unknown mode '{name}'. Type /modes to list them.")
        }
    }

    /// Snapshot of mode, selection, providers and memory.
    #[must_use]
    pub fn status(&self) -> String {
        let provider = match self.router.current_provider().forced() {
            Some(p) => p.to_string(),
            None => "auto (fallback order)".to_string(),
        };
        let model = match self.router.current_model().forced() {
            Some(m) => m.to_string(),
            None => "auto (by mode)".to_string(),
        };
        let available = self.router.list_available_providers();
        let available = if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        };
        let stats = self.memory.stats();
        let mode = self.modes.current();
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let now = self.now();
        let focus = match self.study.focus_remaining(now) {
            Some(minutes) => format!("{minutes} min left"),
            None => format!("inactive ({} completed)", self.study.focus_completed()),
        };
        let study = self.study.stats();

        let mut lines = vec![
            "Status:".to_string(),
            format!("  - Mode: {} (model tier: {})", mode.display_name, mode.model_tier),
            format!("  - Provider: {provider}"),
            format!("  - Model: {model}"),
            format!("  - Available providers: {available}"),
            format!("  - AI ready: {}", yes_no(self.capabilities.any_provider_key)),
            format!("  - Language: {}", self.language.current()),
            format!(
                "  - Memory: {} ({}/{} messages, {} stored exchanges)",
                stats.backend,
                stats.short_term_messages,
                stats.short_term_limit,
                stats.long_term_entries
            ),
            format!(
                "  - Models registry: {}",
                if self.capabilities.models_file {
                    "file"
                } else {
                    "built-in"
                }
            ),
            format!("  - Focus: {focus}"),
        ];
        if study.sessions > 0 {
            lines.push(format!(
                "  - Study: {:.1} h over {} sessions",
                study.total_hours, study.sessions
            ));
        }
        lines.join("\n")
    }

    /// Route chat text (never a slash command) and record the exchange.
    ///
    /// Failures are recorded in the history as their readable description
    /// and returned as the typed error.
    pub async fn send(&mut self, input: &str) -> Result<String, RouterError> {
        let lang = self.language.detect(input);
        self.memory.push(ChatMessage::user(input));

        let recalled: Vec<String> = if self.capabilities.long_term_memory {
            self.memory
                .search(input, RECALL_LIMIT)
                .into_iter()
                .map(|e| e.content.clone())
                .collect()
        } else {
            Vec::new()
        };
        let recalled: Vec<&str> = recalled.iter().map(String::as_str).collect();

        let mode = self.modes.current();
        let system = build_system_prompt(mode, lang.instruction(), &recalled);
        let mut messages = Vec::with_capacity(self.memory.stats().short_term_messages + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(self.memory.history().cloned());

        let result = self
            .router
            .route_request(&messages, mode.model_tier, None, self.temperature, self.max_tokens)
            .await;
        let response = match &result {
            Ok(text) => text.clone(),
            Err(e) => {
                warn!(mode = mode.name, error = %e, "request failed");
                describe_error(e)
            },
        };

        self.memory.push(ChatMessage::assistant(response.clone()));
        self.memory.remember(MemoryEntry {
            content: format!("Q: {input}\nA: {response}"),
            mode: mode.name.to_string(),
            language: lang.code().to_string(),
        });
        result
    }
}

fn help_text() -> String {
    let width = HELP.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
    let mut lines = vec!["Commands:".to_string()];
    lines.extend(
        HELP.iter()
            .map(|(cmd, what)| format!("  {cmd:<width$}  {what}")),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        jarvis_agents::{ChatTransport, CompletionRequest},
        jarvis_config::{KeyStore, ModelsConfig},
        std::sync::{Arc, Mutex},
    };

    /// Echoes the tier-resolved model and records the messages sent.
    #[derive(Default)]
    struct RecordingTransport {
        fail: bool,
        requests: Mutex<Vec<(String, String, Vec<ChatMessage>)>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn complete(&self, request: &CompletionRequest<'_>) -> anyhow::Result<String> {
            self.requests.lock().unwrap().push((
                request.provider.to_string(),
                request.model.to_string(),
                request.messages.to_vec(),
            ));
            if self.fail {
                anyhow::bail!("HTTP 503 service unavailable");
            }
            Ok(format!("reply from {}", request.model))
        }
    }

    fn session(keys: &[&str], fail: bool) -> (ChatSession, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport {
            fail,
            ..Default::default()
        });
        let router = AiRouter::new(
            ModelsConfig::builtin(),
            KeyStore::from_pairs(keys.iter().map(|k| (*k, "key"))),
            transport.clone(),
        );
        let config = JarvisConfig::default();
        let caps = Capabilities {
            long_term_memory: true,
            models_file: false,
            any_provider_key: !keys.is_empty(),
        };
        (ChatSession::new(router, &config, caps), transport)
    }

    #[tokio::test]
    async fn empty_input_returns_empty_string() {
        let (mut s, transport) = session(&["groq"], false);
        assert_eq!(s.process("   ").await, "");
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mode_tier_picks_the_model() {
        let (mut s, transport) = session(&["groq"], false);
        s.process("/planner").await;
        let reply = s.process("plan my day please").await;

        // planner routes with the fast tier.
        assert_eq!(reply, "reply from llama-3.1-8b-instant");
        let reqs = transport.requests.lock().unwrap();
        let (provider, _, messages) = &reqs[0];
        assert_eq!(provider, "groq");
        assert_eq!(messages[0].role, jarvis_agents::Role::System);
        assert!(messages[0].content.contains("daily planning assistant"));
        assert!(messages[0].content.contains("Respond in English."));
        assert_eq!(messages.last().unwrap().content, "plan my day please");
    }

    #[tokio::test]
    async fn history_and_recall_feed_the_next_request() {
        let (mut s, transport) = session(&["groq"], false);
        s.process("tell me about borrowing in rust").await;
        s.process("rust").await;

        let reqs = transport.requests.lock().unwrap();
        let (_, _, second) = &reqs[1];
        // system + user + assistant + user
        assert_eq!(second.len(), 4);
        assert!(second[0].content.contains("From earlier conversations:"));
        assert!(second[0].content.contains("Q: tell me about borrowing in rust"));
        assert_eq!(s.memory().stats().long_term_entries, 2);
    }

    #[tokio::test]
    async fn provider_and_model_commands_drive_the_router() {
        let (mut s, transport) = session(&["groq", "gemini"], false);
        assert!(s.process("/provider groq").await.starts_with("Provider selected: groq"));
        assert!(s.process("/model custom-model").await.starts_with("Model selected"));
        s.process("hello").await;
        assert_eq!(s.router().current_provider().to_string(), "groq");

        assert!(s.process("/auto").await.starts_with("Automatic mode restored"));
        assert!(s.router().current_provider().is_automatic());
        assert!(s.router().current_model().is_automatic());

        let reqs = transport.requests.lock().unwrap();
        assert_eq!(reqs[0].0, "groq");
        assert_eq!(reqs[0].1, "custom-model");
    }

    #[tokio::test]
    async fn unknown_provider_is_explained() {
        let (mut s, _) = session(&[], false);
        let reply = s.process("/provider nonexistent").await;
        assert!(reply.contains("Unknown provider 'nonexistent'"));
        assert!(reply.contains("groq"));
        assert!(s.router().current_provider().is_automatic());
    }

    #[tokio::test]
    async fn failures_become_readable_replies() {
        let (mut s, _) = session(&[], false);
        let reply = s.process("hello").await;
        assert!(reply.starts_with("No API keys found."));

        let (mut s, _) = session(&["groq"], true);
        s.process("/provider groq").await;
        let reply = s.process("hello").await;
        assert!(reply.contains("Provider 'groq' failed"), "{reply}");
        assert!(reply.contains("/auto"));
        // The failure text is kept in the history like any reply.
        assert_eq!(s.memory().stats().short_term_messages, 2);
    }

    #[tokio::test]
    async fn send_returns_the_typed_error() {
        let (mut s, _) = session(&[], false);
        let err = s.send("hello").await.unwrap_err();
        assert!(matches!(err, RouterError::NoProvidersConfigured));
    }

    #[tokio::test]
    async fn mode_commands() {
        let (mut s, _) = session(&[], false);
        assert_eq!(s.process("/code").await, "Mode changed: CODE");
        assert_eq!(s.process("/mode focus").await, "Mode changed: FOCUS");
        assert_eq!(s.process("/mode analytics").await, "Mode changed: ANALYTICS");
        assert!(s.process("/mode warp").await.starts_with("Unknown mode 'warp'"));
        assert_eq!(s.process("/default").await, "Mode changed: PRO");
        assert!(s.process("/modes").await.contains("/pro - PRO  (current)"));
    }

    #[tokio::test]
    async fn status_clear_and_help() {
        let (mut s, _) = session(&["deepseek"], false);
        s.process("salom").await;

        let status = s.process("/status").await;
        assert!(status.contains("Mode: PRO (model tier: pro)"));
        assert!(status.contains("Provider: auto (fallback order)"));
        assert!(status.contains("Available providers: deepseek"));
        assert!(status.contains("Language: uz"));
        assert!(status.contains("Models registry: built-in"));
        assert!(status.contains("AI ready: yes"));

        let (mut keyless, _) = session(&[], false);
        assert!(keyless.process("/status").await.contains("AI ready: no"));

        assert_eq!(s.process("/clear").await, "Conversation history cleared.");
        assert_eq!(s.memory().stats().short_term_messages, 0);

        let help = s.process("/help").await;
        assert!(help.starts_with("Commands:"));
        assert!(help.contains("/providers"));

        assert!(s.process("/bogus").await.contains("/help"));
    }

    type SharedTime = Arc<Mutex<NaiveDateTime>>;

    /// A session whose clock starts on Monday 2026-10-12 at `hh:mm`.
    fn clocked(keys: &[&str], hh: u32, mm: u32) -> (ChatSession, Arc<RecordingTransport>, SharedTime) {
        let start = chrono::NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap();
        let time: SharedTime = Arc::new(Mutex::new(start));
        let (s, transport) = session(keys, false);
        let shared = time.clone();
        let s = s.with_clock(Arc::new(move || *shared.lock().unwrap()));
        (s, transport, time)
    }

    fn advance(time: &SharedTime, minutes: i64) {
        let mut t = time.lock().unwrap();
        *t += chrono::Duration::minutes(minutes);
    }

    fn bracketed_id(reply: &str) -> String {
        let start = reply.rfind('[').unwrap() + 1;
        let end = reply.rfind(']').unwrap();
        reply[start..end].to_string()
    }

    #[tokio::test]
    async fn timetable_and_homework_commands() {
        let (mut s, transport, _) = clocked(&[], 8, 50);

        let added = s.process("/add_class math monday 09:00 10:30 A1 Karimov").await;
        assert!(added.starts_with("Class added: 09:00-10:30: math (A1)"), "{added}");
        s.process("/add_class history wed 09:00 10:00").await;
        assert!(s.process("/schedule").await.starts_with("Classes on monday:\n  09:00-10:30: math"));
        assert_eq!(s.process("/schedule sunday").await, "No classes on sunday.");
        assert!(s.process("/week").await.contains("wednesday:\n  09:00-10:00: history (-)"));

        let reminders = s.process("/reminders").await;
        assert_eq!(reminders, "[high] math starts in 10 min, room A1, with Karimov.");

        let hw = s.process("/add_hw math exercises 4 to 9 2026-10-12 high").await;
        assert!(hw.starts_with("Homework added: math ["), "{hw}");
        s.process("/add_task groceries milk #home").await;
        assert!(s.process("/homework").await.contains("math: exercises 4 to 9 (due 2026-10-12, high)"));
        assert!(s.process("/tasks").await.contains("task groceries #home (medium): milk"));
        assert!(s.process("/reminders").await.contains("[urgent] math: 'exercises 4 to 9' is due TODAY."));

        let today = s.process("/today").await;
        assert!(today.starts_with("Today: 2026-10-12 monday\nClasses (1):"));
        assert!(today.contains("Next: math in 10 min"));
        assert!(today.contains("Pending homework (1):\n  - math: exercises 4 to 9"));

        let done = s.process(&format!("/done_hw {}", bracketed_id(&hw))).await;
        assert_eq!(done, "Homework done: math: exercises 4 to 9");
        assert!(s.process("/done_hw ffffffff").await.starts_with("no homework matches id"));
        assert!(s.process("/homework math").await.contains("exercises 4 to 9 (due 2026-10-12, high) done"));
        assert!(s.process("/stats").await.contains("Homework: 1 total, 1 done, 0 pending, 0 overdue"));

        let class_id = bracketed_id(&added);
        assert_eq!(s.process(&format!("/remove_class {class_id}")).await, "Class removed: math");
        assert!(s.process("/add_class x monday 10:00 09:00").await.starts_with("class must end"));
        assert!(s.process("/add_hw math").await.starts_with("usage: /add_hw"));

        // None of this reaches a provider or the conversation history.
        assert!(transport.requests.lock().unwrap().is_empty());
        assert_eq!(s.memory().stats().short_term_messages, 0);
    }

    #[tokio::test]
    async fn study_sessions_and_status() {
        let (mut s, _, time) = clocked(&[], 16, 0);
        assert!(s.process("/study_end").await.starts_with("no study session is running"));
        assert_eq!(s.process("/study_start").await, "Study session started: General.");
        advance(&time, 20);
        assert_eq!(
            s.process("/study_start calculus").await,
            "Ended General after 20 min. Study session started: calculus."
        );
        advance(&time, 40);
        assert_eq!(s.process("/study_end").await, "Study session ended: calculus, 40 min.");

        let stats = s.process("/study_stats").await;
        assert!(stats.starts_with("Study: 2 sessions, 60 min (1.0 h)"));
        assert!(stats.contains("  - calculus: 40 min"));
        assert!(s.process("/status").await.contains("Study: 1.0 h over 2 sessions"));
        assert!(s.process("/today").await.contains("Studied today: 60 min"));
    }

    #[tokio::test]
    async fn focus_timer_switches_mode_and_announces_the_end() {
        let (mut s, _, time) = clocked(&[], 16, 0);
        assert_eq!(
            s.process("/focus 20").await,
            "Focus started: 20 min. Mode changed: FOCUS"
        );
        assert_eq!(s.modes().current().name, "focus");
        advance(&time, 5);
        assert!(s.process("/status").await.contains("Focus: 15 min left"));

        advance(&time, 15);
        let reply = s.process("/status").await;
        assert!(reply.starts_with("Focus session of 20 min finished."), "{reply}");
        assert!(reply.contains("Focus: inactive (1 completed)"));
        assert_eq!(s.process("/focus stop").await, "Focus timer is not running.");

        s.process("/focus").await;
        advance(&time, 7);
        assert_eq!(s.process("/focus stop").await, "Focus stopped after 7 min.");
        assert!(s.process("/focus 0").await.starts_with("invalid number of minutes"));
    }

    #[tokio::test]
    async fn homework_help_routes_in_the_pro_tier() {
        let (mut s, transport, _) = clocked(&["groq"], 16, 0);
        s.process("/fast").await;
        let reply = s.process("/hw_help physics Newton's second law").await;
        assert_eq!(reply, "reply from llama-3.3-70b-versatile");

        let reqs = transport.requests.lock().unwrap();
        let (_, _, messages) = &reqs[0];
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("In this mode:"));
        assert_eq!(
            messages[1].content,
            study::homework_help_prompt("physics", "Newton's second law")
        );
        drop(reqs);

        assert_eq!(s.memory().stats().short_term_messages, 0);
        assert_eq!(s.modes().current().name, "fast");
        assert_eq!(
            s.process("/hw_help physics").await,
            "usage: /hw_help <subject> <description>"
        );
    }

    #[tokio::test]
    async fn homework_help_without_keys_explains() {
        let (mut s, _, _) = clocked(&[], 16, 0);
        assert!(s.process("/hw_help math limits").await.starts_with("No API keys found."));
    }

    #[test]
    fn every_error_kind_has_a_hint() {
        let cause = || -> Box<dyn std::error::Error + Send + Sync> { "boom".into() };
        let errors = [
            RouterError::InvalidProvider {
                name: "x".into(),
                available: vec!["groq".into()],
            },
            RouterError::ProviderUnavailable {
                provider: "groq".into(),
            },
            RouterError::NoModelForMode {
                mode: "study".into(),
                providers: vec!["groq".into()],
            },
            RouterError::ProviderCallFailed {
                provider: "groq".into(),
                model: "m".into(),
                source: cause(),
            },
            RouterError::AllProvidersFailed {
                provider: "groq".into(),
                model: "m".into(),
                attempted: vec!["groq".into()],
                source: cause(),
            },
            RouterError::NoProvidersConfigured,
        ];
        for err in &errors {
            let text = describe_error(err);
            assert!(!text.is_empty());
        }
        assert!(describe_error(&errors[1]).contains("GROQ_API_KEY"));
        assert!(describe_error(&errors[4]).contains("Last error: boom"));
    }
}
