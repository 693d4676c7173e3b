//! Borrow and return, delegated to the database's remote procedures
//!
//! Unlike the menu, an empty procedure result is an error here so scripts
//! see a non-zero exit status.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use shelfctl_core::{RpcOutcome, Transport};

use super::Session;
use crate::output::Circulation;

#[derive(Parser, Debug)]
pub struct CirculationArgs {
    /// Member ID
    #[arg(long, short)]
    pub member: i64,

    /// Book ID
    #[arg(long, short)]
    pub book: i64,
}

pub async fn run_borrow<T: Transport, W: Write>(
    args: CirculationArgs,
    session: &Session<T>,
    out: &mut W,
) -> Result<()> {
    let outcome = session
        .progress
        .wrap(
            "Borrowing...",
            session.library.borrow_book(args.member, args.book),
        )
        .await
    .context("Borrow error")?;
    report_outcome(Circulation::Borrow, outcome, out)
}

pub async fn run_return<T: Transport, W: Write>(
    args: CirculationArgs,
    session: &Session<T>,
    out: &mut W,
) -> Result<()> {
    let outcome = session
        .progress
        .wrap(
            "Returning...",
            session.library.return_book(args.member, args.book),
        )
        .await
    .context("Return error")?;
    report_outcome(Circulation::Return, outcome, out)
}

fn report_outcome<W: Write>(kind: Circulation, outcome: RpcOutcome, out: &mut W) -> Result<()> {
    match outcome {
        RpcOutcome::Completed(value) => {
            writeln!(out, "{}", kind.success_message(&value))?;
            Ok(())
        }
        RpcOutcome::Rejected => Err(anyhow!(kind.rejected_message())),
    }
}
