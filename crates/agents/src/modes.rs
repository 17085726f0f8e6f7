//! Assistant modes: persona prompt, behaviour rules and the model tier each
//! mode routes with.

use tracing::debug;

/// Mode used when a requested name is unknown.
pub const FALLBACK_MODE: &str = "pro";

/// A named assistant mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Lower-case key used in commands and settings.
    pub name: &'static str,
    pub display_name: &'static str,
    pub system_prompt: &'static str,
    /// Registry tier (`fast`, `code` or `pro`) the router resolves models by.
    pub model_tier: &'static str,
    pub behavior_rules: &'static [&'static str],
}

const MODES: &[Mode] = &[
    Mode {
        name: "fast",
        display_name: "FAST",
        system_prompt: "You are JARVIS-X, an ultra-fast AI assistant. Give concise, direct answers. \
                        No extra explanations. Max 2-3 sentences. Be precise and efficient.",
        model_tier: "fast",
        behavior_rules: &[
            "ultra-concise responses",
            "no preamble or filler text",
            "direct answers only",
        ],
    },
    Mode {
        name: "code",
        display_name: "CODE",
        system_prompt: "You are JARVIS-X, an expert coding assistant. Provide working, \
                        production-ready code. Support multiple programming languages. Include \
                        brief comments only when necessary. Always provide complete, runnable \
                        code snippets.",
        model_tier: "code",
        behavior_rules: &[
            "code-first responses",
            "use best coding models",
            "multi-language support",
            "working code only",
        ],
    },
    Mode {
        name: "pro",
        display_name: "PRO",
        system_prompt: "You are JARVIS-X, a professional AI research assistant. Provide detailed, \
                        well-researched, step-by-step responses. Think carefully before \
                        answering. Include reasoning, examples, and thorough explanations. Be \
                        comprehensive and accurate.",
        model_tier: "pro",
        behavior_rules: &[
            "detailed explanations",
            "step-by-step reasoning",
            "research-grade quality",
            "comprehensive answers",
        ],
    },
    Mode {
        name: "study",
        display_name: "STUDY",
        system_prompt: "You are JARVIS, an AI tutor and study assistant. Explain topics clearly \
                        and simply. Generate summaries, quizzes, and practice questions. Help \
                        prepare for exams. Provide examples. Structure explanations with \
                        headings, bullet points, and examples.",
        model_tier: "pro",
        behavior_rules: &[
            "structured explanations",
            "generate quizzes on request",
            "exam preparation",
            "multi-language support",
        ],
    },
    Mode {
        name: "planner",
        display_name: "PLANNER",
        system_prompt: "You are JARVIS, a daily planning assistant. Help organize the day with \
                        classes, study sessions, breaks, and tasks. Suggest optimal schedules. Be \
                        proactive about time management.",
        model_tier: "fast",
        behavior_rules: &[
            "time-aware responses",
            "schedule optimization",
            "proactive suggestions",
        ],
    },
    Mode {
        name: "focus",
        display_name: "FOCUS",
        system_prompt: "You are JARVIS in deep focus mode. Keep responses ultra-brief. Only allow \
                        urgent topics. Help maintain concentration. Suggest Pomodoro timers. \
                        Suppress distractions.",
        model_tier: "fast",
        behavior_rules: &[
            "minimal responses",
            "focus-oriented",
            "pomodoro support",
            "distraction blocking",
        ],
    },
    Mode {
        name: "analytics",
        display_name: "ANALYTICS",
        system_prompt: "You are JARVIS analytics assistant. Provide productivity insights, study \
                        time analysis, task completion rates, and weekly reports. Use data to \
                        suggest improvements.",
        model_tier: "pro",
        behavior_rules: &[
            "data-driven insights",
            "productivity tracking",
            "weekly reports",
            "improvement suggestions",
        ],
    },
    Mode {
        name: "automation",
        display_name: "AUTOMATION",
        system_prompt: "You are JARVIS automation assistant. Help automate repetitive tasks, \
                        create scripts, set up workflows, and reduce manual effort.",
        model_tier: "code",
        behavior_rules: &[
            "task automation",
            "workflow creation",
            "efficiency optimization",
        ],
    },
];

fn lookup(name: &str) -> Option<&'static Mode> {
    let key = name.trim().to_lowercase();
    MODES.iter().find(|m| m.name == key)
}

/// Index of [`FALLBACK_MODE`] in `MODES`.
const FALLBACK_INDEX: usize = 2;

fn fallback() -> &'static Mode {
    &MODES[FALLBACK_INDEX]
}

/// Tracks the session's current mode.
#[derive(Debug, Clone)]
pub struct ModeManager {
    current: &'static Mode,
}

impl ModeManager {
    /// Start in `default_mode`; unknown names start in `pro`.
    #[must_use]
    pub fn new(default_mode: &str) -> Self {
        let current = lookup(default_mode).unwrap_or_else(|| {
            debug!(mode = default_mode, "unknown default mode, using {FALLBACK_MODE}");
            fallback()
        });
        Self { current }
    }

    /// Switch modes. Returns `false` (and keeps the current mode) for
    /// unknown names.
    pub fn set_mode(&mut self, name: &str) -> bool {
        match lookup(name) {
            Some(mode) => {
                self.current = mode;
                true
            },
            None => false,
        }
    }

    #[must_use]
    pub fn current(&self) -> &'static Mode {
        self.current
    }

    /// Mode by name; unknown names resolve to `pro`.
    #[must_use]
    pub fn get(&self, name: &str) -> &'static Mode {
        lookup(name).unwrap_or_else(fallback)
    }

    /// All modes in display order.
    #[must_use]
    pub fn list(&self) -> &'static [Mode] {
        MODES
    }

    #[must_use]
    pub fn system_prompt(&self) -> &'static str {
        self.current.system_prompt
    }

    #[must_use]
    pub fn model_tier(&self) -> &'static str {
        self.current.model_tier
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new(FALLBACK_MODE)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, jarvis_config::MODEL_TIERS};

    #[test]
    fn eight_modes_with_known_tiers() {
        let modes = ModeManager::default();
        assert_eq!(modes.list().len(), 8);
        for mode in modes.list() {
            assert!(MODEL_TIERS.contains(&mode.model_tier), "{}", mode.name);
            assert!(!mode.behavior_rules.is_empty());
        }
    }

    #[test]
    fn fallback_index_points_at_pro() {
        assert_eq!(fallback().name, FALLBACK_MODE);
    }

    #[test]
    fn unknown_default_starts_in_pro() {
        assert_eq!(ModeManager::new("turbo").current().name, "pro");
        assert_eq!(ModeManager::new("CODE").current().name, "code");
    }

    #[test]
    fn set_mode_rejects_unknown_names() {
        let mut modes = ModeManager::new("fast");
        assert!(!modes.set_mode("nope"));
        assert_eq!(modes.current().name, "fast");
        assert!(modes.set_mode("Study"));
        assert_eq!(modes.current().display_name, "STUDY");
    }

    #[test]
    fn extended_modes_route_with_base_tiers() {
        let mut modes = ModeManager::default();
        modes.set_mode("planner");
        assert_eq!(modes.model_tier(), "fast");
        modes.set_mode("automation");
        assert_eq!(modes.model_tier(), "code");
        assert!(modes.system_prompt().contains("automation"));
    }

    #[test]
    fn get_falls_back_to_pro() {
        let modes = ModeManager::default();
        assert_eq!(modes.get("analytics").display_name, "ANALYTICS");
        assert_eq!(modes.get("missing").name, "pro");
    }
}
