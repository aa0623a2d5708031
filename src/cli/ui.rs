//! Shared prompt and output helpers
//!
//! Conventions:
//! - Prompts: lowercase with colon and space: `designation: `
//! - Feedback: short sentence with a trailing period: `Saved.`
//! - Errors and warnings go to stderr, data to stdout

use anyhow::{anyhow, Result};
use inquire::{ui::RenderConfig, Confirm, InquireError, Select, Text};

use crate::form::{EntityForm, FieldError, FormController};

/// Rows shown at once in selection menus
const SELECT_PAGE_SIZE: usize = 12;

/// Truncate a string to max_chars, adding an ellipsis if needed.
/// The result is at most max_chars characters.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

/// `first_name` -> `first name`
pub fn field_label(field: &str) -> String {
    field.replace('_', " ")
}

#[inline]
pub fn status(msg: &str) {
    println!("{}", msg);
}

#[inline]
pub fn warning(msg: &str) {
    eprintln!("Warning: {}", msg);
}

pub fn print_field_errors(errors: &[FieldError]) {
    for e in errors {
        eprintln!("  {}: {}", field_label(e.field), e.message);
    }
}

/// Get a minimal render config for inquire prompts
pub fn minimal_render_config() -> RenderConfig<'static> {
    RenderConfig::default_colored()
        .with_prompt_prefix(inquire::ui::Styled::new(""))
        .with_answered_prompt_prefix(inquire::ui::Styled::new(""))
}

/// Display a selection menu and return the chosen index
pub fn select<T: ToString>(prompt: &str, options: &[T]) -> Result<Option<usize>> {
    if options.is_empty() {
        return Ok(None);
    }

    let items: Vec<String> = options.iter().map(|o| o.to_string()).collect();
    let result = Select::new(prompt, items.clone())
        .with_render_config(minimal_render_config())
        .with_page_size(SELECT_PAGE_SIZE)
        .with_vim_mode(true)
        .prompt_skippable()?;

    Ok(result.and_then(|selected| items.iter().position(|i| *i == selected)))
}

/// Narrow lookup results to one record, asking the user when several match.
/// Returns None if the user backs out of the menu.
pub fn choose<T, F>(matches: Vec<T>, what: &str, query: &str, label: F) -> Result<Option<T>>
where
    F: Fn(&T) -> String,
{
    match matches.len() {
        0 => Err(anyhow!("No {} found matching '{}'", what, query)),
        1 => Ok(matches.into_iter().next()),
        _ => {
            let labels: Vec<String> = matches.iter().map(&label).collect();
            let picked = select(&format!("Several {}s match '{}':", what, query), &labels)?;
            Ok(picked.and_then(|i| matches.into_iter().nth(i)))
        }
    }
}

/// Prompt for yes/no confirmation (default: no)
pub fn confirm(prompt: &str) -> Result<bool> {
    let result = Confirm::new(prompt)
        .with_render_config(minimal_render_config())
        .with_default(false)
        .prompt_skippable()?;
    Ok(result.unwrap_or(false))
}

/// Result type for form inputs that can be cancelled
pub enum FormResult<T> {
    Value(T),
    Cancelled,
}

/// Prompt for a field with optional current value
/// Format: `field [current]: ` or `field: ` if no current value
/// Empty input keeps the current value; `-` clears it
pub fn prompt_field(field: &str, current: Option<&str>) -> Result<FormResult<String>> {
    let has_value = current.map(|v| !v.is_empty()).unwrap_or(false);
    let prompt = match current {
        Some(val) if !val.is_empty() => format!("{} [{}] (- clears): ", field, truncate(val, 30)),
        _ => format!("{}: ", field),
    };

    let result = Text::new(&prompt)
        .with_render_config(minimal_render_config())
        .prompt();

    match result {
        Ok(input) => {
            let input = input.trim();
            if input == "-" && has_value {
                Ok(FormResult::Value(String::new()))
            } else if input.is_empty() {
                Ok(FormResult::Value(current.unwrap_or("").to_string()))
            } else {
                Ok(FormResult::Value(input.to_string()))
            }
        }
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Ok(FormResult::Cancelled)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prompt for an optional field (returns empty string if skipped)
pub fn prompt_field_optional(field: &str) -> Result<FormResult<String>> {
    let prompt = format!("{}: ", field);

    let result = Text::new(&prompt)
        .with_render_config(minimal_render_config())
        .prompt();

    match result {
        Ok(input) => Ok(FormResult::Value(input.trim().to_string())),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Ok(FormResult::Cancelled)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prompt for each of `fields` in turn, pre-filled with the form's values
pub fn fill_fields<F: EntityForm>(form: &mut FormController<F>, fields: &[&str]) -> Result<FormResult<()>> {
    for &field in fields {
        let current = form.value(field).map(str::to_string);
        match prompt_field(&field_label(field), current.as_deref())? {
            FormResult::Value(v) => form.handle_change(field, v)?,
            FormResult::Cancelled => return Ok(FormResult::Cancelled),
        }
    }
    Ok(FormResult::Value(()))
}

/// Prompt again for the fields that failed validation until the form is
/// valid or the user gives up
pub fn fix_errors<F: EntityForm>(form: &mut FormController<F>) -> Result<FormResult<()>> {
    while !form.validate() {
        eprintln!("Please fix:");
        print_field_errors(form.errors());
        let fields: Vec<&'static str> = form.errors().iter().map(|e| e.field).collect();
        if let FormResult::Cancelled = fill_fields(form, &fields)? {
            return Ok(FormResult::Cancelled);
        }
    }
    Ok(FormResult::Value(()))
}
