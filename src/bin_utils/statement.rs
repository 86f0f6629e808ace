use std::io::{self, Write};

use crate::account::{Account, AccountNumber};

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

pub struct AccountSummary<'a> {
    pub branch: &'a str,
    pub number: AccountNumber,
    pub holder: &'a str,
}

pub fn print_statement<W>(output: &mut W, account: &Account) -> io::Result<()>
where
    W: Write,
{
    writeln!(output, "\n================ STATEMENT ================")?;
    let mut entries = account.history().entries().peekable();
    if entries.peek().is_none() {
        writeln!(output, "No transactions recorded.")?;
    }
    for entry in entries {
        writeln!(
            output,
            "{}:\n\tR$ {:.2} - {}",
            entry.kind,
            entry.amount,
            entry.at.format(TIMESTAMP_FORMAT)
        )?;
    }
    writeln!(output, "\nBalance:\n\tR$ {:.2}", account.balance())?;
    writeln!(output, "===========================================")
}

pub fn print_accounts<'a, W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountSummary<'a>>,
) -> io::Result<()>
where
    W: Write,
{
    let mut accounts = accounts.peekable();
    if accounts.peek().is_none() {
        return writeln!(output, "\n@@@ No accounts registered. @@@");
    }
    for acc in accounts {
        writeln!(output, "{}", "=".repeat(60))?;
        writeln!(output, "Branch:\t{}", acc.branch)?;
        writeln!(output, "Account:\t{}", acc.number)?;
        writeln!(output, "Holder:\t{}", acc.holder)?;
    }
    Ok(())
}
