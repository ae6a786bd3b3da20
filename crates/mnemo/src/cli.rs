//! CLI (Command Line Interface) mode
//!
//! Interactive REPL over the registered tools, plus a one-shot execute mode
//! that runs a single slash command.

use mnemo_core::{ToolManager, ToolResult};
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use serde_json::{Value as JsonValue, json};
use std::borrow::Cow;
use tracing::{debug, info};

/// Available commands for autocomplete and help
const COMMANDS: &[(&str, &str)] = &[
    ("/save", "<key> <value>  Save or overwrite a memory"),
    ("/recall", "<key>  Show a memory"),
    ("/list", "List all memory keys"),
    ("/delete", "<key>  Delete a memory"),
    ("/search", "<term>  Search keys and values"),
    ("/pdf", "<path>  Read text from a PDF file"),
    ("/web", "<query>  Search the web"),
    ("/tools", "List registered tools"),
    ("/help", "Show this help"),
    ("/exit", "Quit"),
];

/// A parsed REPL line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a registered tool with JSON input
    Tool { name: &'static str, input: JsonValue },
    Tools,
    Help,
    Exit,
}

/// Parse a slash command into the tool call it stands for
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Err("Commands start with '/'. Type /help for the list.".to_string());
    }

    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    let required = |usage: &str| {
        if rest.is_empty() {
            Err(format!("Usage: {} {}", cmd, usage))
        } else {
            Ok(rest.to_string())
        }
    };

    match cmd.to_lowercase().as_str() {
        "/save" => {
            let (key, value) = rest
                .split_once(char::is_whitespace)
                .map(|(k, v)| (k, v.trim()))
                .filter(|(_, v)| !v.is_empty())
                .ok_or_else(|| "Usage: /save <key> <value>".to_string())?;
            Ok(Command::Tool {
                name: "save_memory",
                input: json!({"key": key, "value": value}),
            })
        }
        "/recall" => Ok(Command::Tool {
            name: "recall_memory",
            input: json!({"key": required("<key>")?}),
        }),
        "/list" => Ok(Command::Tool {
            name: "list_memories",
            input: json!({}),
        }),
        "/delete" => Ok(Command::Tool {
            name: "delete_memory",
            input: json!({"key": required("<key>")?}),
        }),
        "/search" => Ok(Command::Tool {
            name: "search_memory",
            input: json!({"term": required("<term>")?}),
        }),
        "/pdf" => Ok(Command::Tool {
            name: "read_pdf",
            input: json!({"path": required("<path>")?}),
        }),
        "/web" => Ok(Command::Tool {
            name: "web_search",
            input: json!({"query": required("<query>")?}),
        }),
        "/tools" => Ok(Command::Tools),
        "/help" | "/?" => Ok(Command::Help),
        "/exit" | "/quit" | "/q" => Ok(Command::Exit),
        _ => Err(format!(
            "Unknown command: {}. Type /help for the list.",
            cmd
        )),
    }
}

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        // only the command word is completed
        if !line.starts_with('/') || line.contains(' ') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// Custom prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("mnemo> ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// Run CLI interactive mode
pub async fn run_cli(tool_manager: &ToolManager) -> anyhow::Result<()> {
    info!("Starting CLI mode with {} tools", tool_manager.len());

    print_welcome();

    let mut keybindings = default_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(60))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                if line.trim().is_empty() {
                    continue;
                }

                match parse_command(&line) {
                    Ok(Command::Exit) => {
                        println!("\nBye.\n");
                        break;
                    }
                    Ok(Command::Help) => print_help(),
                    Ok(Command::Tools) => print_tools(tool_manager),
                    Ok(Command::Tool { name, input }) => {
                        let result = execute_tool(tool_manager, name, input).await;
                        print_result(&result);
                    }
                    Err(message) => eprintln!("\n{}\n", message),
                }
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("\nBye.\n");
                break;
            }
            Err(err) => {
                eprintln!("\nError: {}\n", err);
                break;
            }
        }
    }

    Ok(())
}

/// Non-interactive mode: run one command and exit
///
/// ```bash
/// mnemo --exec "/save name Alice"
/// mnemo -e "/search alice"
/// ```
pub async fn run_execute(tool_manager: &ToolManager, line: &str) -> anyhow::Result<()> {
    match parse_command(line).map_err(|e| anyhow::anyhow!(e))? {
        Command::Tool { name, input } => {
            let result = execute_tool(tool_manager, name, input).await;
            if result.is_error {
                anyhow::bail!(result.output);
            }
            println!("{}", result.output);
        }
        Command::Tools => print_tools(tool_manager),
        Command::Help => print_help(),
        Command::Exit => {}
    }
    Ok(())
}

/// Execute a tool by name, folding every failure into an error result
async fn execute_tool(tool_manager: &ToolManager, name: &str, input: JsonValue) -> ToolResult {
    info!("Executing tool: {}", name);
    debug!("Tool input: {}", input);
    match tool_manager.execute(name, input).await {
        Ok(result) => result,
        Err(e) => ToolResult::error(format!("Tool execution error: {}", e)),
    }
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('c'), ReedlineEvent::CtrlC);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::CtrlD);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

fn print_result(result: &ToolResult) {
    if result.is_error {
        eprintln!("\n{}\n", Color::Red.paint(&result.output));
    } else {
        println!("\n{}\n", result.output);
    }
}

fn print_welcome() {
    println!();
    println!("mnemo {} - persistent agent memory", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, Tab or / to complete, Ctrl+D to quit.");
    println!();
}

fn print_help() {
    println!();
    println!("Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {:<8} {}", cmd, desc);
    }
    println!();
}

fn print_tools(tool_manager: &ToolManager) {
    println!();
    println!("Registered tools ({}):", tool_manager.len());
    for def in tool_manager.definitions() {
        println!("  {:<14} {}", def.name, def.description);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_keeps_spaces_in_value() {
        let cmd = parse_command("/save name  Alice Smith ").unwrap();
        assert_eq!(
            cmd,
            Command::Tool {
                name: "save_memory",
                input: json!({"key": "name", "value": "Alice Smith"}),
            }
        );
    }

    #[test]
    fn test_parse_save_requires_value() {
        assert_eq!(
            parse_command("/save name"),
            Err("Usage: /save <key> <value>".to_string())
        );
        assert!(parse_command("/save").is_err());
    }

    #[test]
    fn test_parse_single_argument_commands() {
        assert_eq!(
            parse_command("/recall name").unwrap(),
            Command::Tool {
                name: "recall_memory",
                input: json!({"key": "name"}),
            }
        );
        assert_eq!(
            parse_command("/search hello world").unwrap(),
            Command::Tool {
                name: "search_memory",
                input: json!({"term": "hello world"}),
            }
        );
        assert_eq!(
            parse_command("/pdf /tmp/a file.pdf").unwrap(),
            Command::Tool {
                name: "read_pdf",
                input: json!({"path": "/tmp/a file.pdf"}),
            }
        );
        assert_eq!(
            parse_command("/WEB rust sqlite").unwrap(),
            Command::Tool {
                name: "web_search",
                input: json!({"query": "rust sqlite"}),
            }
        );
    }

    #[test]
    fn test_parse_missing_argument() {
        assert_eq!(
            parse_command("/delete"),
            Err("Usage: /delete <key>".to_string())
        );
    }

    #[test]
    fn test_parse_builtin_commands() {
        assert_eq!(
            parse_command("/list").unwrap(),
            Command::Tool {
                name: "list_memories",
                input: json!({}),
            }
        );
        assert_eq!(parse_command("/tools").unwrap(), Command::Tools);
        assert_eq!(parse_command("/?").unwrap(), Command::Help);
        assert_eq!(parse_command("/quit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_parse_rejects_unknown_and_plain_text() {
        assert!(parse_command("/frobnicate").unwrap_err().starts_with("Unknown command"));
        assert!(parse_command("hello").unwrap_err().starts_with("Commands start with"));
    }

    #[test]
    fn test_completer_only_completes_command_word() {
        let mut completer = CommandCompleter::new();
        let suggestions = completer.complete("/s", 2);
        let values: Vec<String> = suggestions.into_iter().map(|s| s.value).collect();
        assert_eq!(values, vec!["/save", "/search"]);

        assert!(completer.complete("/save na", 8).is_empty());
        assert!(completer.complete("save", 4).is_empty());
    }
}
