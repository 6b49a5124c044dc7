// Command-line interface definitions for redraft
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating the man page.

use clap::Parser;

#[derive(Parser)]
#[command(name = "redraft")]
#[command(author, version, about = "Rewrite selected text anywhere with a hotkey")]
#[command(long_about = "
Redraft rewrites the text selected in any application using Google Gemini.
Select some text, press a hotkey, and the selection is replaced in place.

SETUP:
  1. Get an API key from https://aistudio.google.com/app/apikey
  2. Copy config.example.yaml to config.yaml and set gemini.api_key
     (or export REDRAFT_API_KEY)
  3. macOS: grant Accessibility permission to your terminal
     Linux: install xdotool (X11) or ydotool (Wayland)
  4. Run: redraft

DEFAULT HOTKEYS:
  cmd+shift+g   Fix grammar, spelling, and punctuation
  cmd+shift+f   Make the text formal and professional
  cmd+shift+c   Make the text casual and friendly
  cmd+shift+s   Simplify the text
  cmd+shift+e   Expand the text with more detail

CONFIGURATION:
  The config file is read from $REDRAFT_CONFIG, ./config.yaml, or the
  user config directory (e.g. ~/.config/redraft/config.yaml).
  Set RUST_LOG to override the configured log level.
")]
pub struct Cli {}
