//! Terminal rendering of the record table and the two dialogs.
//!
//! Views hold no business logic. They render state and turn user input into
//! the payloads the controller sends.

use std::fmt::Write as _;

use thiserror::Error;

use crate::api_client::{CreateRequest, UpdateRequest};
use sheetdb_core::{Record, RowIndex};

/// Rejections raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// One table row and the actions it offers.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    pub index: RowIndex,
    pub record: &'a Record,
}

impl TableRow<'_> {
    /// Data and position to open the edit dialog with.
    pub fn edit_action(&self) -> (Record, RowIndex) {
        (self.record.clone(), self.index)
    }

    /// Position to arm for deletion.
    pub fn delete_action(&self) -> RowIndex {
        self.index
    }
}

/// Table of records in list order.
pub struct TableView<'a> {
    records: &'a [Record],
}

impl<'a> TableView<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'a>> + 'a {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| TableRow { index, record })
    }

    pub fn row(&self, index: RowIndex) -> Option<TableRow<'a>> {
        self.records.get(index).map(|record| TableRow { index, record })
    }

    pub fn render(&self) -> String {
        let names: Vec<String> = self.records.iter().map(Record::full_name).collect();
        let name_width = names
            .iter()
            .map(|n| n.chars().count())
            .chain(std::iter::once("NAME".len()))
            .max()
            .unwrap_or(0);
        let index_width = self.records.len().saturating_sub(1).to_string().len().max(1);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>iw$}  {:<nw$}  EMAIL",
            "#",
            "NAME",
            iw = index_width,
            nw = name_width
        );
        if self.records.is_empty() {
            out.push_str("(no rows)\n");
            return out;
        }
        for (row, name) in self.rows().zip(&names) {
            let _ = writeln!(
                out,
                "{:>iw$}  {:<nw$}  {}",
                row.index,
                name,
                row.record.email,
                iw = index_width,
                nw = name_width
            );
        }
        out
    }
}

/// Whether the form creates a record or edits the one at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { index: RowIndex },
}

/// Payload produced by a valid form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(CreateRequest),
    Update(UpdateRequest),
}

/// Add/edit dialog shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDialog {
    mode: FormMode,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl FormDialog {
    /// Empty dialog for a new record.
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        }
    }

    /// Dialog pre-filled from the record at `index`.
    pub fn edit(record: &Record, index: RowIndex) -> Self {
        Self {
            mode: FormMode::Edit { index },
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add New Row",
            FormMode::Edit { .. } => "Edit Row",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Row",
            FormMode::Edit { .. } => "Save Changes",
        }
    }

    /// Checks required fields and email shape, then builds the payload.
    pub fn submission(&self) -> Result<Submission, FormError> {
        let fields = [
            ("First Name", &self.first_name),
            ("Last Name", &self.last_name),
            ("Email", &self.email),
        ];
        for (label, value) in fields {
            if value.is_empty() {
                return Err(FormError::MissingField(label));
            }
        }
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail(self.email.clone()));
        }

        Ok(match self.mode {
            FormMode::Create => Submission::Create(CreateRequest {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                email: self.email.clone(),
            }),
            FormMode::Edit { index } => Submission::Update(UpdateRequest {
                row: [
                    self.first_name.clone(),
                    self.last_name.clone(),
                    self.email.clone(),
                ],
                index,
            }),
        })
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n  First Name: {}\n  Last Name:  {}\n  Email:      {}\n[{}]\n",
            self.title(),
            self.first_name,
            self.last_name,
            self.email,
            self.submit_label()
        )
    }
}

/// Loose `local@domain` check, as browsers apply to email inputs.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Answer to the delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirm,
    Cancel,
}

/// Confirm/cancel prompt shown before a delete.
pub struct DeleteConfirm;

impl DeleteConfirm {
    pub const PROMPT: &'static str = "Are you sure you want to delete this?";

    pub fn render() -> String {
        format!("{} [y/N] ", Self::PROMPT)
    }

    /// Parses an answer; empty input cancels, unrecognised input yields `None`.
    pub fn parse_answer(input: &str) -> Option<Choice> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Choice::Confirm),
            "" | "n" | "no" => Some(Choice::Cancel),
            _ => None,
        }
    }
}
