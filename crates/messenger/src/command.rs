/// Reply strategy selected from the text of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Exactly `start`: show the legal-process menu.
    Start,
    /// `weather <city>`.
    Weather { city: String },
    /// `image me <query>`.
    ImageSearch { query: String },
    /// Anything else is echoed back verbatim.
    Echo(String),
}

const START: &str = "start";
const WEATHER_PREFIX: &str = "weather ";
const IMAGE_PREFIX: &str = "image me ";

impl Command {
    /// Match the text against the known commands, in order.
    ///
    /// Matching is case-sensitive and does not trim. Arguments are single
    /// tokens split on one space, so `weather new york` looks up `new`.
    pub fn parse(text: &str) -> Self {
        if text == START {
            Self::Start
        } else if text.starts_with(WEATHER_PREFIX) {
            Self::Weather {
                city: nth_token(text, 1),
            }
        } else if text.starts_with(IMAGE_PREFIX) {
            Self::ImageSearch {
                query: nth_token(text, 2),
            }
        } else {
            Self::Echo(text.to_string())
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Weather { .. } => "weather",
            Self::ImageSearch { .. } => "image",
            Self::Echo(_) => "echo",
        }
    }
}

fn nth_token(text: &str, n: usize) -> String {
    text.split(' ').nth(n).unwrap_or_default().to_string()
}
