//! # Shell Completion Module
//!
//! Completion scripts come from `clap_complete`. For bash and fish a small
//! hook is appended that completes mood names for `path`, `recommend` and
//! `journey` by calling the hidden `isotune complete-emotions` command.
//!
//! ```bash
//! isotune completion bash > ~/.local/share/bash-completion/completions/isotune
//! isotune completion fish > ~/.config/fish/completions/isotune.fish
//! ```

use crate::affect::AffectSpace;
use crate::cli::Shell;
use anyhow::{Context, Result};
use clap::Command;
use clap_complete::{generate, Shell as CompletionShell};
use std::io::Write;

const BASH_EMOTION_HOOK: &str = r#"
_isotune_with_emotions() {
    local cur="${COMP_WORDS[COMP_CWORD]}"
    case "${COMP_WORDS[1]}" in
        path|recommend|journey)
            if [[ "$cur" != -* && $COMP_CWORD -le 3 ]]; then
                mapfile -t COMPREPLY < <(compgen -W "$(isotune complete-emotions 2>/dev/null)" -- "$cur")
                return 0
            fi
            ;;
    esac
    _isotune "$@"
}
complete -F _isotune_with_emotions -o bashdefault -o default isotune
"#;

const FISH_EMOTION_HOOK: &str = "
complete -c isotune -f -n '__fish_seen_subcommand_from path recommend journey' -a '(isotune complete-emotions 2>/dev/null)' -d 'Mood'
";

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let name = cmd.get_name().to_string();
    generate(shell_to_completion_shell(shell), cmd, name, out);

    let hook = match shell {
        Shell::Bash => BASH_EMOTION_HOOK,
        Shell::Fish => FISH_EMOTION_HOOK,
        _ => return Ok(()),
    };
    out.write_all(hook.as_bytes())
        .context("Failed to write completion hook")
}

/// Mood names offered for completion, in vocabulary order.
#[must_use]
pub fn emotion_completions(space: &AffectSpace) -> Vec<&str> {
    space.iter().map(|(name, _)| name).collect()
}

/// Print one mood name per line for the shell hooks.
pub fn print_emotion_completions(out: &mut dyn Write) -> Result<()> {
    for name in emotion_completions(AffectSpace::global()) {
        writeln!(out, "{name}").context("Failed to write completions")?;
    }
    Ok(())
}
