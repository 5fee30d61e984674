//! Line-oriented terminal I/O
//!
//! Interactive input goes through a line editor owned by a dedicated input
//! thread; secrets are read in raw mode so they are never echoed. Tests use
//! a scripted terminal fed from a buffer.

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use parking_lot::Mutex;
use roster_core::{ConfirmDelete, DeleteTarget};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{mpsc, Arc};

/// Input typed in a form to abandon it
pub(crate) const CANCEL: &str = ":cancel";

/// Whether typed characters are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Echo {
    Visible,
    Hidden,
}

struct ReadRequest {
    prompt: String,
    echo: Echo,
    reply: mpsc::Sender<io::Result<Option<String>>>,
}

/// Handle to the input thread
struct LineEditor {
    requests: mpsc::Sender<ReadRequest>,
}

impl LineEditor {
    fn spawn() -> io::Result<Self> {
        let (requests, incoming) = mpsc::channel::<ReadRequest>();
        let (ready_tx, ready) = mpsc::channel();

        std::thread::Builder::new()
            .name("roster-input".into())
            .spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => {
                        let _ = ready_tx.send(Ok(()));
                        editor
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(readline_error(e)));
                        return;
                    }
                };
                for request in incoming {
                    let answer = match request.echo {
                        Echo::Visible => read_edited(&mut editor, &request.prompt),
                        Echo::Hidden => read_hidden(&request.prompt),
                    };
                    let _ = request.reply.send(answer);
                }
            })?;

        ready.recv().map_err(|_| input_gone())??;
        Ok(Self { requests })
    }

    fn read(&self, prompt: &str, echo: Echo) -> io::Result<Option<String>> {
        let (reply, answer) = mpsc::channel();
        self.requests
            .send(ReadRequest {
                prompt: prompt.to_string(),
                echo,
                reply,
            })
            .map_err(|_| input_gone())?;
        answer.recv().map_err(|_| input_gone())?
    }
}

fn input_gone() -> io::Error {
    io::Error::other("input thread has exited")
}

fn readline_error(error: ReadlineError) -> io::Error {
    match error {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

fn read_edited(editor: &mut DefaultEditor, prompt: &str) -> io::Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
        Err(e) => Err(readline_error(e)),
    }
}

fn read_hidden(prompt: &str) -> io::Result<Option<String>> {
    let mut out = io::stdout();
    write!(out, "{prompt}")?;
    out.flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        return Ok(Some(strip_line_ending(line)));
    }

    terminal::enable_raw_mode()?;
    let answer = collect_hidden();
    terminal::disable_raw_mode()?;
    write!(out, "\r\n")?;
    out.flush()?;
    answer
}

fn collect_hidden() -> io::Result<Option<String>> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return Ok(Some(secret)),
            KeyCode::Char('c' | 'd') if ctrl => return Ok(None),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}

fn strip_line_ending(mut line: String) -> String {
    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    line
}

enum Input {
    Editor(LineEditor),
    Script(Box<dyn BufRead + Send>),
}

/// Line reader and writer
pub(crate) struct Terminal {
    input: Input,
    output: Box<dyn Write + Send>,
}

impl Terminal {
    /// The process terminal, with line editing and history
    pub(crate) fn interactive() -> io::Result<Self> {
        Ok(Self {
            input: Input::Editor(LineEditor::spawn()?),
            output: Box::new(io::stdout()),
        })
    }

    /// Terminal reading answers from `input` and echoing them to `output`
    pub(crate) fn scripted(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input: Input::Script(input),
            output,
        }
    }

    pub(crate) fn say(&mut self, text: &str) -> io::Result<()> {
        if text.ends_with('\n') {
            self.output.write_all(text.as_bytes())?;
        } else {
            writeln!(self.output, "{text}")?;
        }
        self.output.flush()
    }

    /// Print `prompt` and read one line without its line ending.
    /// `None` at end of input.
    pub(crate) fn read(&mut self, prompt: &str, echo: Echo) -> io::Result<Option<String>> {
        self.output.flush()?;
        match &mut self.input {
            Input::Editor(editor) => editor.read(prompt, echo),
            Input::Script(input) => {
                write!(self.output, "{prompt}")?;
                self.output.flush()?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                let line = strip_line_ending(line);
                // echo the way a terminal would
                match echo {
                    Echo::Visible => writeln!(self.output, "{line}")?,
                    Echo::Hidden => writeln!(self.output)?,
                }
                Ok(Some(line))
            }
        }
    }
}

/// Shared handle so the shell and the delete prompt use one terminal
pub(crate) type SharedTerminal = Arc<Mutex<Terminal>>;

/// Read one answer on the blocking pool so the runtime's workers stay free
pub(crate) async fn read(
    term: &SharedTerminal,
    prompt: &str,
    echo: Echo,
) -> io::Result<Option<String>> {
    let term = Arc::clone(term);
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || term.lock().read(&prompt, echo))
        .await
        .map_err(io::Error::other)?
}

/// Asks `y/N` on the terminal before a delete
pub(crate) struct TerminalConfirm {
    pub(crate) term: SharedTerminal,
}

#[async_trait]
impl ConfirmDelete for TerminalConfirm {
    async fn confirm(&self, target: &DeleteTarget) -> bool {
        let question = match &target.name {
            Some(name) => format!("Delete {name} ({})? [y/N] ", target.id.short()),
            None => format!("Delete record {}? [y/N] ", target.id),
        };
        match read(&self.term, &question, Echo::Visible).await {
            Ok(Some(answer)) => matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "confirmation prompt failed");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Writer whose contents tests can read back
    #[derive(Clone, Default)]
    pub(crate) struct Captured(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl Captured {
        pub(crate) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Terminal fed from `script`, with its output captured
    pub(crate) fn scripted(script: &str) -> (SharedTerminal, Captured) {
        let out = Captured::default();
        let term = Terminal::scripted(
            Box::new(io::Cursor::new(script.as_bytes().to_vec())),
            Box::new(out.clone()),
        );
        (Arc::new(Mutex::new(term)), out)
    }
}
