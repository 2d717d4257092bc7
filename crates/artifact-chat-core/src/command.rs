use serde::{Deserialize, Serialize};

/// Entries of the slash-command menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandId {
    Help,
    Clear,
    Code,
    Image,
    Document,
}

/// What selecting a command does, interpreted by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "message", rename_all = "snake_case")]
pub enum CommandEffect {
    /// Send this text as if the user had typed it
    SendMessage(String),
    /// Drop the conversation and close the artifact panel
    ClearConversation,
}

/// A catalog row, as shown in the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlashCommand {
    pub id: CommandId,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: CommandEffect,
}

impl CommandId {
    pub fn all() -> Vec<CommandId> {
        vec![
            CommandId::Help,
            CommandId::Clear,
            CommandId::Code,
            CommandId::Image,
            CommandId::Document,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandId::Help => "/help",
            CommandId::Clear => "/clear",
            CommandId::Code => "/code",
            CommandId::Image => "/image",
            CommandId::Document => "/document",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandId::Help => "Show available commands",
            CommandId::Clear => "Clear chat history",
            CommandId::Code => "Generate sample code",
            CommandId::Image => "Generate an image",
            CommandId::Document => "Create a document",
        }
    }

    pub fn effect(&self) -> CommandEffect {
        match self {
            CommandId::Help => CommandEffect::SendMessage("Show me all available commands".to_string()),
            CommandId::Clear => CommandEffect::ClearConversation,
            CommandId::Code => CommandEffect::SendMessage("Generate a React component".to_string()),
            CommandId::Image => {
                CommandEffect::SendMessage("Generate an image of a landscape".to_string())
            }
            CommandId::Document => CommandEffect::SendMessage("Create a document about AI".to_string()),
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all().into_iter().find(|c| c.name() == lower)
    }

    pub fn command(&self) -> SlashCommand {
        SlashCommand {
            id: *self,
            name: self.name(),
            description: self.description(),
            effect: self.effect(),
        }
    }
}

/// The full catalog in menu order
pub fn catalog() -> Vec<SlashCommand> {
    CommandId::all().iter().map(CommandId::command).collect()
}

/// Catalog entries whose name starts with the typed input (e.g. "/c")
pub fn matching(input: &str) -> Vec<CommandId> {
    let lower = input.to_lowercase();
    CommandId::all()
        .into_iter()
        .filter(|c| c.name().starts_with(&lower))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_names() {
        let names: Vec<&str> = catalog().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["/help", "/clear", "/code", "/image", "/document"]);
        assert!(catalog().iter().all(|c| c.name.starts_with('/')));
    }

    #[test]
    fn test_effects() {
        assert_eq!(
            CommandId::Help.effect(),
            CommandEffect::SendMessage("Show me all available commands".into())
        );
        assert_eq!(CommandId::Clear.effect(), CommandEffect::ClearConversation);
        assert_eq!(
            CommandId::Document.effect(),
            CommandEffect::SendMessage("Create a document about AI".into())
        );
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CommandId::from_name("/code"), Some(CommandId::Code));
        assert_eq!(CommandId::from_name("/CLEAR"), Some(CommandId::Clear));
        assert_eq!(CommandId::from_name("/nope"), None);
        assert_eq!(CommandId::from_name("help"), None);
    }

    #[test]
    fn test_matching_prefix() {
        assert_eq!(matching("/"), CommandId::all());
        assert_eq!(matching("/c"), vec![CommandId::Clear, CommandId::Code]);
        assert_eq!(matching("/im"), vec![CommandId::Image]);
        assert!(matching("/z").is_empty());
    }

    #[test]
    fn test_catalog_serializes_as_data() {
        let json = serde_json::to_value(CommandId::Clear.command()).unwrap();
        assert_eq!(json["id"], "clear");
        assert_eq!(json["name"], "/clear");
        assert_eq!(json["effect"]["effect"], "clear_conversation");

        let json = serde_json::to_value(CommandId::Code.effect()).unwrap();
        assert_eq!(json["effect"], "send_message");
        assert_eq!(json["message"], "Generate a React component");
    }
}
