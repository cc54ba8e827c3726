//! Headless mode for the storybook.
//!
//! A simple text-based interface for generating and reading stories without
//! a TUI. It's designed for scripting and automated testing.

use std::io::{self, BufRead, Write};

use story_core::headless::{HeadlessConfig, HeadlessStory};
use story_core::{Narrator, SessionError, SilentNarrator, StoryConfig};

const HELP: &[&str] = &[
    "  #next          - Next page",
    "  #prev          - Previous page",
    "  #page          - Show the current page again",
    "  #story         - Show the whole story",
    "  #play          - Play / pause narration",
    "  #mute          - Mute / unmute",
    "  #new           - Write a new story",
    "  #edit          - Replace the story text (end with a line containing only .)",
    "  #save          - Save the story to history",
    "  #export [dir]  - Export the story as a text file",
    "  #history       - List saved stories",
    "  #open <id>     - Open a saved story",
    "  #key <key>     - Store an OpenAI API key",
    "  #clearkey      - Remove the stored API key",
    "  #help          - Show this help",
    "  #quit          - Exit",
    "  (anything else writes a new story with that as additional context)",
];

/// Run the storybook in headless mode on stdin and stdout.
///
/// This provides a simple line-oriented protocol:
/// - Lines starting with `#` are commands (next, prev, save, quit, ...)
/// - Any other line writes a new story using the line as additional context
/// - Output lines are tagged, e.g. `[PAGE]`, `[SAVED]`, `[ERROR]`
pub async fn run_headless(
    config: &StoryConfig,
    headless_config: HeadlessConfig,
) -> Result<(), SessionError> {
    let mut book = HeadlessStory::from_config(config, headless_config, SilentNarrator).await?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "=== Social Story Headless Mode ===")?;
    print_story(&book, &mut stdout)?;
    writeln!(stdout)?;
    writeln!(stdout, "Commands:")?;
    for line in HELP {
        writeln!(stdout, "{line}")?;
    }
    writeln!(stdout)?;

    run_protocol(&mut book, stdin.lock(), &mut stdout).await?;
    Ok(())
}

/// Read commands from `input` until it ends or `#quit`.
pub async fn run_protocol<N: Narrator, R: BufRead, W: Write>(
    book: &mut HeadlessStory<N>,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = line.strip_prefix('#') else {
            writeln!(out, "[PROCESSING] Writing a new story...")?;
            match book.regenerate_with_context(line).await {
                Ok(_) => print_story(book, out)?,
                Err(e) => writeln!(out, "[ERROR] {e}")?,
            }
            out.flush()?;
            continue;
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match name {
            "quit" | "exit" => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            "next" => {
                book.next();
                print_page(book, out)?;
            }
            "prev" => {
                book.prev();
                print_page(book, out)?;
            }
            "page" => print_page(book, out)?,
            "story" => match book.story() {
                Some(story) => {
                    writeln!(out, "[STORY] {}", story.title())?;
                    writeln!(out, "{}", story.content)?;
                }
                None => writeln!(out, "[ERROR] No story")?,
            },
            "play" => {
                book.toggle_play();
                print_playback(book, out)?;
            }
            "mute" => {
                book.toggle_mute();
                print_playback(book, out)?;
            }
            "new" => {
                writeln!(out, "[PROCESSING] Writing a new story...")?;
                match book.generate().await {
                    Ok(_) => print_story(book, out)?,
                    Err(e) => writeln!(out, "[ERROR] {e}")?,
                }
            }
            "edit" => {
                writeln!(out, "[EDIT] Enter the new story text, then a line with only .")?;
                out.flush()?;
                let mut text = Vec::new();
                for line in lines.by_ref() {
                    let line = line?;
                    if line.trim() == "." {
                        break;
                    }
                    text.push(line);
                }
                match book.edit(text.join("\n")) {
                    Ok(_) => {
                        writeln!(out, "[EDITED] Use #save to keep the changes")?;
                        print_page(book, out)?;
                    }
                    Err(e) => writeln!(out, "[ERROR] Edit failed: {e}")?,
                }
            }
            "save" => match book.save().await {
                Ok(()) => writeln!(out, "[SAVED] Story saved to history")?,
                Err(e) => writeln!(out, "[ERROR] Save failed: {e}")?,
            },
            "export" => match book.export(arg.unwrap_or(".")).await {
                Ok(path) => writeln!(out, "[EXPORTED] {}", path.display())?,
                Err(e) => writeln!(out, "[ERROR] Export failed: {e}")?,
            },
            "history" => {
                writeln!(out, "[HISTORY] {} saved", book.history().len())?;
                for story in book.history().iter() {
                    let demo = if story.is_fallback { " (demo)" } else { "" };
                    writeln!(
                        out,
                        "  {}  {}{}  {}",
                        story.id,
                        story.title(),
                        demo,
                        story.created_at.format("%Y-%m-%d %H:%M")
                    )?;
                    writeln!(out, "    {}", story.preview())?;
                }
            }
            "open" => match arg {
                Some(id) => match book.open(id) {
                    Ok(_) => print_story(book, out)?,
                    Err(e) => writeln!(out, "[ERROR] {e}")?,
                },
                None => writeln!(out, "[ERROR] Usage: #open <id>")?,
            },
            "key" => match arg {
                Some(key) => match book.set_credential(key).await {
                    Ok(true) => writeln!(out, "[KEY] API key saved")?,
                    Ok(false) => writeln!(out, "[ERROR] API key is blank")?,
                    Err(e) => writeln!(out, "[ERROR] {e}")?,
                },
                None => writeln!(out, "[ERROR] Usage: #key <key>")?,
            },
            "clearkey" => match book.clear_credential().await {
                Ok(()) => writeln!(out, "[KEY] API key removed")?,
                Err(e) => writeln!(out, "[ERROR] {e}")?,
            },
            "help" => {
                writeln!(out, "[HELP]")?;
                for line in HELP {
                    writeln!(out, "{line}")?;
                }
            }
            _ => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
        }
        out.flush()?;
    }

    Ok(())
}

fn print_story<N: Narrator, W: Write>(book: &HeadlessStory<N>, out: &mut W) -> io::Result<()> {
    let Some(story) = book.story() else {
        return writeln!(out, "[ERROR] No story");
    };

    writeln!(out, "[STORY] {} ({})", story.title(), story.id)?;
    if let Some(subtitle) = story.subtitle() {
        writeln!(out, "[ABOUT] {subtitle}")?;
    }
    if story.is_fallback {
        writeln!(out, "[DEMO] This is a demo story")?;
        if let Some(notice) = book.notice() {
            writeln!(out, "[DEMO] {notice}")?;
        }
    }
    if let Some(advisory) = book.advisory() {
        writeln!(out, "[NOTICE] {advisory}")?;
    }
    print_page(book, out)
}

fn print_page<N: Narrator, W: Write>(book: &HeadlessStory<N>, out: &mut W) -> io::Result<()> {
    match (book.page_label(), book.page_text()) {
        (Some(label), Some(text)) => {
            writeln!(out, "[PAGE] {label}")?;
            writeln!(out, "{text}")?;
        }
        _ => writeln!(out, "[ERROR] No story")?,
    }
    Ok(())
}

fn print_playback<N: Narrator, W: Write>(book: &HeadlessStory<N>, out: &mut W) -> io::Result<()> {
    let state = book.playback();
    writeln!(
        out,
        "[PLAYBACK] playing: {}, muted: {}",
        state.playing, state.muted
    )?;
    if state.playing && !book.storybook().narration_supported() {
        writeln!(out, "[NOTICE] Narration is not available here")?;
    }
    Ok(())
}
