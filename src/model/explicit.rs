//! Reader for the explicit model format.
//!
//! A model consists of up to four text files:
//!
//! - `.tra`: an optional `dtmc` line, a header (either `STATES n` and `TRANSITIONS m`,
//!   or a single line `n m`), followed by one `source target value` line per transition.
//! - `.lab`: a `#DECLARATION` section listing all labels, terminated by `#END`, followed
//!   by `state label...` lines. The `init` label marks the initial states.
//! - `.rew` (optional): `state value` lines with state rewards.
//! - `.trew` (optional): `source target value` lines with transition rewards.
//!
//! Values are parsed with [`ValueOps::parse_value`], so the same files can be read as
//! floating point, exact or parametric models. Empty lines and lines starting with `//`
//! are ignored.

use crate::model::dtmc::is_probability;
use crate::model::{Dtmc, DtmcBuilder, ModelError};
use crate::value::ValueOps;
use log::info;
use std::path::{Path, PathBuf};

/// Parse a model from the contents of its files.
pub fn parse_dtmc<V: ValueOps>(
    transitions: &str,
    labels: &str,
    state_rewards: Option<&str>,
    transition_rewards: Option<&str>,
) -> Result<Dtmc<V>, ModelError> {
    let mut builder = parse_transitions::<V>(transitions)?;
    parse_labels(&mut builder, labels)?;
    if let Some(text) = state_rewards {
        for (line, tokens) in content_lines(text) {
            let (state, value) = match tokens.as_slice() {
                [state, value @ ..] if !value.is_empty() => (*state, value.join(" ")),
                _ => return Err(ModelError::parse(line, "Expected `state value`.")),
            };
            let state = parse_index(line, state)?;
            builder.add_state_reward(state, parse_value(line, &value)?)?;
        }
    }
    if let Some(text) = transition_rewards {
        for (line, tokens) in content_lines(text) {
            let (source, target, value) = parse_triple::<V>(line, &tokens)?;
            builder.add_transition_reward(source, target, value)?;
        }
    }
    builder.build()
}

/// Load a model from `<stem>.tra` and `<stem>.lab`, together with `<stem>.rew` and
/// `<stem>.trew` if these files exist.
pub fn load_dtmc<V: ValueOps>(stem: &Path) -> Result<Dtmc<V>, ModelError> {
    let transitions = read_file(&stem.with_extension("tra"))?;
    let labels = read_file(&stem.with_extension("lab"))?;
    let state_rewards = read_optional_file(&stem.with_extension("rew"))?;
    let transition_rewards = read_optional_file(&stem.with_extension("trew"))?;
    let model = parse_dtmc(
        &transitions,
        &labels,
        state_rewards.as_deref(),
        transition_rewards.as_deref(),
    )?;
    info!(
        "Loaded `{}` with {} states and {} transitions.",
        stem.display(),
        model.state_count(),
        model.transition_matrix().entry_count()
    );
    Ok(model)
}

/// The path of `file` without its extension, i.e. the argument of [`load_dtmc`].
pub fn model_stem(file: &Path) -> PathBuf {
    file.with_extension("")
}

fn parse_transitions<V: ValueOps>(text: &str) -> Result<DtmcBuilder<V>, ModelError> {
    let mut lines = content_lines(text).peekable();
    if let Some((_, tokens)) = lines.peek()
        && tokens.len() == 1
        && tokens[0].eq_ignore_ascii_case("dtmc")
    {
        lines.next();
    }

    let Some((header_line, header)) = lines.next() else {
        return Err(ModelError::parse(1, "Missing transition header."));
    };
    let (state_count, transition_count) = match header.as_slice() {
        ["STATES", states] => {
            let states = parse_index(header_line, states)?;
            match lines.next() {
                Some((line, tokens)) if tokens.len() == 2 && tokens[0] == "TRANSITIONS" => {
                    (states, parse_index(line, tokens[1])?)
                }
                _ => return Err(ModelError::parse(header_line + 1, "Expected `TRANSITIONS m`.")),
            }
        }
        [states, transitions] => (
            parse_index(header_line, states)?,
            parse_index(header_line, transitions)?,
        ),
        _ => {
            return Err(ModelError::parse(
                header_line,
                "Expected `STATES n` or `<states> <transitions>`.",
            ));
        }
    };

    let mut builder = DtmcBuilder::new(state_count);
    let mut found = 0;
    for (line, tokens) in lines {
        let (source, target, value) = parse_triple::<V>(line, &tokens)?;
        if !is_probability(&value) {
            return Err(ModelError::parse(line, format!("`{value}` is not a probability.")));
        }
        builder.add_transition(source, target, value)?;
        found += 1;
    }
    if found != transition_count {
        return Err(ModelError::parse(
            header_line,
            format!("Declared {transition_count} transitions, found {found}."),
        ));
    }
    Ok(builder)
}

fn parse_labels<V: ValueOps>(
    builder: &mut DtmcBuilder<V>,
    text: &str,
) -> Result<(), ModelError> {
    let mut lines = content_lines(text);
    match lines.next() {
        Some((_, tokens)) if tokens == ["#DECLARATION"] => (),
        Some((line, _)) => return Err(ModelError::parse(line, "Expected `#DECLARATION`.")),
        None => return Err(ModelError::parse(1, "Missing label declaration.")),
    }

    let mut declared = Vec::new();
    loop {
        match lines.next() {
            Some((_, tokens)) if tokens == ["#END"] => break,
            Some((_, tokens)) => declared.extend(tokens.into_iter().map(str::to_string)),
            None => {
                return Err(ModelError::parse(text.lines().count(), "Missing `#END`."));
            }
        }
    }
    for label in &declared {
        builder.declare_label(label);
    }

    for (line, tokens) in lines {
        let Some((state, labels)) = tokens.split_first() else {
            continue;
        };
        let state = parse_index(line, state)?;
        for label in labels {
            if !declared.iter().any(|it| it == label) {
                return Err(ModelError::UndeclaredLabel(label.to_string()));
            }
            builder.add_label(label, state)?;
        }
    }
    Ok(())
}

/// Non-empty, non-comment lines split into whitespace-separated tokens, with 1-based
/// line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("//"))
        .map(|(index, line)| (index, line.split_whitespace().collect()))
}

fn parse_triple<V: ValueOps>(
    line: usize,
    tokens: &[&str],
) -> Result<(usize, usize, V), ModelError> {
    match tokens {
        [source, target, value @ ..] if !value.is_empty() => Ok((
            parse_index(line, source)?,
            parse_index(line, target)?,
            parse_value(line, &value.join(" "))?,
        )),
        _ => Err(ModelError::parse(line, "Expected `source target value`.")),
    }
}

fn parse_index(line: usize, token: &str) -> Result<usize, ModelError> {
    token
        .parse::<usize>()
        .map_err(|_| ModelError::parse(line, format!("`{token}` is not a state index.")))
}

fn parse_value<V: ValueOps>(line: usize, text: &str) -> Result<V, ModelError> {
    V::parse_value(text).map_err(|e| ModelError::parse(line, e.to_string()))
}

fn read_file(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_optional_file(path: &Path) -> Result<Option<String>, ModelError> {
    if path.exists() {
        read_file(path).map(Some)
    } else {
        Ok(None)
    }
}
