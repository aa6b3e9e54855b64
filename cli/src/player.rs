use std::io::{BufRead, Write};

use anyhow::Result;
use shuffle_core::{video::embed_url, EngineState, RotationEngine, RotationError, Song};

const HELP: &str = "[enter] skip  [h] history  [<n>] replay history entry n  [q] quit";

fn show_song<W: Write>(out: &mut W, song: &Song) -> Result<()> {
    writeln!(out, "Now playing: {}", song.now_playing())?;
    match embed_url(&song.url) {
        Some(embed) => writeln!(out, "    {}", embed)?,
        None => writeln!(out, "    {} (no video id)", song.url)?,
    }
    Ok(())
}

/// Terminal front end for a rotation: reads one command per line until `q` or EOF.
pub fn run_session<I, W>(engine: &mut RotationEngine, input: I, out: &mut W) -> Result<()>
where
    I: BufRead,
    W: Write,
{
    if engine.state() == EngineState::Empty {
        writeln!(out, "{}", RotationError::EmptyCatalog)?;
        return Ok(());
    }

    if let Some(song) = engine.current() {
        show_song(out, song)?;
    }
    writeln!(out, "{}", HELP)?;

    for line in input.lines() {
        let line = line?;
        match line.trim() {
            "q" => break,
            "" | "s" => {
                if let Some(song) = engine.advance() {
                    show_song(out, song)?;
                }
            }
            "h" => {
                let history = engine.history();
                if history.is_empty() {
                    writeln!(out, "History is empty")?;
                }
                for (n, song) in history.iter().enumerate() {
                    writeln!(out, "{:>3}. {}", n + 1, song.now_playing())?;
                }
            }
            other => {
                let entry = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|idx| engine.history().get(idx).map(|song| song.id));
                match entry {
                    Some(id) => {
                        let song = engine.select_by_id(id)?;
                        show_song(out, song)?;
                    }
                    None => writeln!(out, "{}", HELP)?,
                }
            }
        }
    }

    Ok(())
}
