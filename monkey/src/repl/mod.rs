//! REPL (Read-Eval-Print Loop) for Monkey

use crate::error::Result;
use crate::interp::Interpreter;
use crate::object::{release_frame, EnvRef, Environment};
use crate::runner::{self, Outcome};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".monkey_history";

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// Evaluation state shared by every line of a REPL session
pub struct Session {
    interpreter: Interpreter,
    env: EnvRef,
}

impl Session {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Session {
            interpreter,
            env: Environment::new().into_ref(),
        }
    }

    /// Evaluate one line. Returns the text to show, if any.
    pub fn eval_line(&mut self, line: &str) -> Option<String> {
        match runner::run(&mut self.interpreter, line, &self.env) {
            Outcome::ParseErrors(errors) => {
                let mut text = String::new();
                for error in &errors {
                    text.push_str(MONKEY_FACE);
                    text.push_str("Woops! We ran into some monkey business here!\n");
                    text.push('\t');
                    text.push_str(&error.message);
                    text.push('\n');
                }
                Some(text.trim_end().to_string())
            }
            Outcome::Value(value) => Some(value.inspect()),
            Outcome::Binding => None,
        }
    }

    pub fn env(&self) -> &EnvRef {
        &self.env
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        release_frame(&self.env);
    }
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            session: Session::new(),
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> Result<()> {
        println!("Hello {}! This is the Monkey programming language!", user_name());
        println!("Feel free to type in commands. Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    if let Some(text) = self.session.eval_line(line) {
                        println!("{text}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }
}

/// Handle REPL commands (starting with :). Returns true to exit.
fn handle_command(cmd: &str) -> bool {
    match cmd {
        ":quit" | ":q" | ":exit" => {
            println!("Goodbye!");
            true
        }
        ":help" | ":h" | ":?" => {
            print_help();
            false
        }
        ":clear" => {
            print!("\x1B[2J\x1B[1;1H");
            false
        }
        _ => {
            println!("Unknown command: {cmd}");
            println!("Type :help for help.");
            false
        }
    }
}

fn print_help() {
    println!("Monkey REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL");
    println!("  :clear          Clear the screen");
    println!();
    println!("You can enter:");
    println!("  - Bindings: let x = 5;");
    println!("  - Functions: let add = fn(a, b) {{ a + b }};");
    println!("  - Expressions: add(x, 2) * 3");
    println!();
    println!("Built-in functions:");
    println!("  len first last rest push     strings and arrays");
    println!("  set contains delete          hashes (set/delete return copies)");
    println!("  puts eval load type          output, evaluation, modules");
}

fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "there".to_string())
}
