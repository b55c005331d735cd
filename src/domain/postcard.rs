//! Postcard send modes, the community return address, and back-of-card
//! rendering.

use std::fmt;
use std::str::FromStr;

/// How a postcard is sent.
///
/// Previews and digital sends run against the provider's test environment;
/// only a physical send consumes a credit and uses live credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    DigitalPreview,
    DigitalSend,
    PhysicalSend,
}

impl SendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendMode::DigitalPreview => "digital_preview",
            SendMode::DigitalSend => "digital_send",
            SendMode::PhysicalSend => "physical_send",
        }
    }

    /// Physical sends go through the provider's live environment.
    pub fn is_live(&self) -> bool {
        matches!(self, SendMode::PhysicalSend)
    }

    /// Only physical sends consume a credit.
    pub fn consumes_credit(&self) -> bool {
        matches!(self, SendMode::PhysicalSend)
    }
}

impl FromStr for SendMode {
    type Err = InvalidSendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "digital_preview" => Ok(SendMode::DigitalPreview),
            "digital_send" => Ok(SendMode::DigitalSend),
            "physical_send" => Ok(SendMode::PhysicalSend),
            other => Err(InvalidSendMode(other.to_string())),
        }
    }
}

impl fmt::Display for SendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid send mode: {0}")]
pub struct InvalidSendMode(pub String);

/// The community's shared mailing address, used as the return address for
/// every send and as the destination for digital sends and previews.
#[derive(Debug, Clone, Copy)]
pub struct CommunityAddress {
    pub name: &'static str,
    pub line1: &'static str,
    pub line2: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
    pub country: &'static str,
}

pub const COMMUNITY_ADDRESS: CommunityAddress = CommunityAddress {
    name: "Postcard Hub",
    line1: "397 Bridge Street",
    line2: "",
    city: "Brooklyn",
    state: "NY",
    zip: "11201",
    country: "US",
};

/// Render the caller-supplied back-of-card text into the HTML fragment the
/// provider expects. The message is plain text; escape it so user input
/// cannot inject markup into the printed card.
pub fn render_back(message: &str) -> String {
    format!("<body>{}</body>", escape_html(message))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
