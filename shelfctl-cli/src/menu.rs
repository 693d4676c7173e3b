//! Interactive numbered menu.
//!
//! Blocking prompt/answer loop over any `BufRead`/`Write` pair. Every choice
//! maps to one library call; failures are printed as `ERROR: ...` and the
//! loop carries on. End of input leaves the loop like `0`.

use std::fmt;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use shelfctl_core::{Library, ShelfError, Transport};

use crate::output::{write_circulation, write_result, write_rows, Circulation, OutputFormat};

pub const MENU: &str = "
1) Register member
2) Add book
3) List all books
4) Search books
5) Show member and borrowed books
6) Update book stock
7) Update member email
8) Delete member
9) Delete book
10) Borrow book
11) Return book
12) Reports
0) Exit
Choose: ";

/// Input closed while a prompt was waiting
#[derive(Debug)]
struct EndOfInput;

impl fmt::Display for EndOfInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "end of input")
    }
}

impl std::error::Error for EndOfInput {}

enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'a, T, R, W> {
    library: &'a Library<T>,
    input: R,
    out: W,
    top_limit: usize,
}

impl<'a, T, R, W> Menu<'a, T, R, W>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    pub fn new(library: &'a Library<T>, input: R, out: W, top_limit: usize) -> Self {
        Self {
            library,
            input,
            out,
            top_limit,
        }
    }

    /// Run until `0` or end of input
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let choice = match self.prompt(MENU) {
                Ok(choice) => choice,
                Err(err) if err.is::<EndOfInput>() => break,
                Err(err) => {
                    writeln!(self.out, "ERROR: {}", err)?;
                    continue;
                }
            };

            match self.dispatch(&choice).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) if err.is::<EndOfInput>() => break,
                Err(err) => {
                    tracing::debug!(choice = %choice, error = %err, "menu action failed");
                    writeln!(self.out, "ERROR: {}", err)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    async fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        let lib = self.library;
        match choice {
            "1" => {
                let name = self.prompt("Name: ")?;
                let email = self.prompt("Email: ")?;
                let rows = lib.add_member(&name, &email).await?;
                write_result(&mut self.out, &rows)?;
            }
            "2" => {
                let title = self.prompt("Title: ")?;
                let author = self.prompt("Author: ")?;
                let category = self.prompt("Category: ")?;
                let stock = self.prompt_int("Stock: ")?;
                let rows = lib.add_book(&title, &author, &category, stock).await?;
                write_result(&mut self.out, &rows)?;
            }
            "3" => {
                let rows = lib.list_books().await?;
                write_rows(&mut self.out, &rows, OutputFormat::Lines)?;
            }
            "4" => {
                let query = self.prompt("Query (title/author/category): ")?;
                let rows = lib.search_books(&query).await?;
                write_rows(&mut self.out, &rows, OutputFormat::Lines)?;
            }
            "5" => {
                let member_id = self.prompt_int("Member ID: ")?;
                let rows = lib.show_member(member_id).await?;
                write_result(&mut self.out, &rows)?;
            }
            "6" => {
                let book_id = self.prompt_int("Book ID: ")?;
                let stock = self.prompt_int("New stock: ")?;
                let rows = lib.update_book_stock(book_id, stock).await?;
                write_result(&mut self.out, &rows)?;
            }
            "7" => {
                let member_id = self.prompt_int("Member ID: ")?;
                let email = self.prompt("New email: ")?;
                let rows = lib.update_member_email(member_id, &email).await?;
                write_result(&mut self.out, &rows)?;
            }
            "8" => {
                let member_id = self.prompt_int("Member ID to delete: ")?;
                let rows = lib.delete_member(member_id).await?;
                write_result(&mut self.out, &rows)?;
            }
            "9" => {
                let book_id = self.prompt_int("Book ID to delete: ")?;
                let rows = lib.delete_book(book_id).await?;
                write_result(&mut self.out, &rows)?;
            }
            "10" => {
                let member_id = self.prompt_int("Member ID: ")?;
                let book_id = self.prompt_int("Book ID: ")?;
                let result = lib.borrow_book(member_id, book_id).await;
                write_circulation(&mut self.out, Circulation::Borrow, result)?;
            }
            "11" => {
                let member_id = self.prompt_int("Member ID: ")?;
                let book_id = self.prompt_int("Book ID: ")?;
                let result = lib.return_book(member_id, book_id).await;
                write_circulation(&mut self.out, Circulation::Return, result)?;
            }
            "12" => {
                let report = lib.report(self.top_limit).await?;
                for (heading, rows) in [
                    ("Top borrowed:", &report.most_borrowed),
                    ("Overdue members:", &report.overdue_members),
                    ("Borrow count per member:", &report.borrow_counts),
                ] {
                    writeln!(self.out, "\n{}", heading)?;
                    write_rows(&mut self.out, rows, OutputFormat::Lines)?;
                }
            }
            "0" => return Ok(Flow::Exit),
            _ => writeln!(self.out, "Invalid choice")?,
        }
        Ok(Flow::Continue)
    }

    /// Show `label`, read one trimmed line
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            return Err(EndOfInput.into());
        }
        Ok(line.trim().to_string())
    }

    fn prompt_int(&mut self, label: &str) -> Result<i64> {
        let raw = self.prompt(label)?;
        raw.parse::<i64>().map_err(|_| {
            ShelfError::invalid_input(
                label.trim_end_matches(": "),
                format!("'{}' is not a whole number", raw),
            )
            .into()
        })
    }
}
