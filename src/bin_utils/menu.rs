use std::str::FromStr;

pub const MENU: &str = "
================ MENU ================
[1]\tNew customer
[2]\tNew account
[3]\tDeposit
[4]\tWithdraw
[5]\tStatement
[6]\tList accounts
[7]\tExit
=> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateCustomer,
    CreateAccount,
    Deposit,
    Withdraw,
    Statement,
    ListAccounts,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::CreateCustomer),
            "2" => Ok(Self::CreateAccount),
            "3" => Ok(Self::Deposit),
            "4" => Ok(Self::Withdraw),
            "5" => Ok(Self::Statement),
            "6" => Ok(Self::ListAccounts),
            "7" => Ok(Self::Exit),
            other => Err(format!("unknown option `{other}`")),
        }
    }
}
