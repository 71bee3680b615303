// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    LeaseViewer,
    Exit,
}

pub fn parse_menu_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::LeaseViewer),
        "2" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// Prints `label` (with `[default]` when one is known) and reads one line.
/// An empty answer falls back to the default; with no default it is an error.
pub fn prompt_with_default<I: BufRead, W: Write>(
    input: &mut I,
    output: &mut W,
    label: &str,
    default: Option<&str>,
) -> Result<String> {
    let written = match default {
        Some(value) => write!(output, "{label} [{value}]: "),
        None => write!(output, "{label}: "),
    };
    written.context("write prompt")?;
    output.flush().context("flush prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("read answer")?;
    if read == 0 {
        bail!("input closed before {label} was entered");
    }

    match (line.trim(), default) {
        ("", Some(value)) => Ok(value.to_owned()),
        ("", None) => bail!("{label} is required"),
        (answer, _) => Ok(answer.to_owned()),
    }
}

/// Reads a password with echo disabled. Enter finishes, Ctrl-C or Esc aborts.
pub fn read_password(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}: ").context("write prompt")?;
    stdout.flush().context("flush prompt")?;

    enable_raw_mode().context("enable raw mode")?;
    let result = collect_password();
    disable_raw_mode().context("disable raw mode")?;
    writeln!(stdout).context("finish password prompt")?;
    result
}

fn collect_password() -> Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = event::read().context("read password key")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("password entry cancelled")
            }
            KeyCode::Esc => bail!("password entry cancelled"),
            KeyCode::Backspace => {
                password.pop();
            }
            KeyCode::Char(ch) => password.push(ch),
            _ => {}
        }
    }
}

/// Main menu loop. Viewer failures are printed and the menu is shown again;
/// end of input behaves like choosing Exit.
pub fn run_menu<I, W, F>(input: &mut I, output: &mut W, mut open_viewer: F) -> Result<()>
where
    I: BufRead,
    W: Write,
    F: FnMut() -> Result<()>,
{
    loop {
        write!(
            output,
            "\nMikroTik Router Utilities\n------------------------\n1. DHCP Lease Viewer\n2. Exit\n\nSelect an option: "
        )
        .context("write menu")?;
        output.flush().context("flush menu")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("read menu choice")? == 0 {
            writeln!(output).context("write menu")?;
            return Ok(());
        }

        match parse_menu_choice(&line) {
            Some(MenuChoice::LeaseViewer) => {
                if let Err(error) = open_viewer() {
                    tracing::warn!("lease viewer failed: {error:#}");
                    writeln!(output, "Error viewing DHCP leases: {error:#}")
                        .context("write error")?;
                }
            }
            Some(MenuChoice::Exit) => {
                writeln!(output, "Goodbye!").context("write farewell")?;
                return Ok(());
            }
            None => {
                writeln!(output, "Invalid option. Please try again.").context("write menu")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MenuChoice, parse_menu_choice, prompt_with_default, run_menu};
    use anyhow::{Result, bail};
    use std::io::Cursor;

    #[test]
    fn menu_choices() {
        assert_eq!(parse_menu_choice("1\n"), Some(MenuChoice::LeaseViewer));
        assert_eq!(parse_menu_choice(" 2 "), Some(MenuChoice::Exit));
        assert_eq!(parse_menu_choice("3"), None);
        assert_eq!(parse_menu_choice(""), None);
    }

    #[test]
    fn prompt_uses_default_on_empty_answer() -> Result<()> {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let answer = prompt_with_default(&mut input, &mut output, "Router IP", Some("192.168.88.1"))?;
        assert_eq!(answer, "192.168.88.1");
        assert_eq!(String::from_utf8(output)?, "Router IP [192.168.88.1]: ");
        Ok(())
    }

    #[test]
    fn prompt_prefers_typed_answer() -> Result<()> {
        let mut input = Cursor::new("  10.0.0.1  \n");
        let mut output = Vec::new();
        let answer = prompt_with_default(&mut input, &mut output, "Router IP", Some("192.168.88.1"))?;
        assert_eq!(answer, "10.0.0.1");
        Ok(())
    }

    #[test]
    fn prompt_without_default_requires_answer() -> Result<()> {
        let mut output = Vec::new();
        let error = prompt_with_default(&mut Cursor::new("\n"), &mut output, "Username", None)
            .expect_err("blank answer should fail");
        assert!(error.to_string().contains("Username is required"));
        assert_eq!(String::from_utf8(output)?, "Username: ");

        let error = prompt_with_default(&mut Cursor::new(""), &mut Vec::new(), "Username", None)
            .expect_err("closed input should fail");
        assert!(error.to_string().contains("input closed"));
        Ok(())
    }

    #[test]
    fn menu_opens_viewer_until_exit() -> Result<()> {
        let mut input = Cursor::new("1\nx\n1\n2\n");
        let mut output = Vec::new();
        let mut opened = 0;
        run_menu(&mut input, &mut output, || {
            opened += 1;
            Ok(())
        })?;

        assert_eq!(opened, 2);
        let text = String::from_utf8(output)?;
        assert!(text.contains("1. DHCP Lease Viewer"));
        assert!(text.contains("Invalid option. Please try again."));
        assert!(text.ends_with("Goodbye!\n"));
        Ok(())
    }

    #[test]
    fn menu_survives_viewer_errors() -> Result<()> {
        let mut input = Cursor::new("1\n2\n");
        let mut output = Vec::new();
        run_menu(&mut input, &mut output, || bail!("channel closed"))?;

        let text = String::from_utf8(output)?;
        assert!(text.contains("Error viewing DHCP leases: channel closed"));
        assert!(text.contains("Goodbye!"));
        Ok(())
    }

    #[test]
    fn menu_exits_on_end_of_input() -> Result<()> {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        run_menu(&mut input, &mut output, || bail!("viewer must not open"))?;
        assert!(!String::from_utf8(output)?.contains("Goodbye!"));
        Ok(())
    }
}
