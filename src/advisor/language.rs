use serde::{Deserialize, Serialize};
use std::fmt;

/// UI language. Selects the localized fallback replies and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    #[default]
    En,
}

impl Language {
    pub fn pick(self, ar: &'static str, en: &'static str) -> &'static str {
        match self {
            Language::Ar => ar,
            Language::En => en,
        }
    }

    pub fn code(self) -> &'static str {
        self.pick("ar", "en")
    }

    /// Seeded as the first assistant message of a conversation.
    pub fn greeting(self) -> &'static str {
        self.pick(
            "مرحباً! أنا مساعدك الزراعي الذكي. كيف يمكنني مساعدتك اليوم؟",
            "Hello! I am your smart agricultural assistant. How can I help you today?",
        )
    }

    /// Reply when no session exists.
    pub fn unreachable_reply(self) -> &'static str {
        self.pick(
            "عذراً، لا يمكنني الاتصال بالخادم حالياً. يرجى التحقق من مفتاح API.",
            "Sorry, I cannot connect to the server right now. Please check the API key.",
        )
    }

    /// Reply when a live chat turn fails.
    pub fn failure_reply(self) -> &'static str {
        self.pick("حدث خطأ ما.", "Something went wrong.")
    }

    pub fn analysis_failed(self) -> &'static str {
        self.pick(
            "فشل التحليل. الرجاء المحاولة مرة أخرى.",
            "Analysis failed. Please try again.",
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
