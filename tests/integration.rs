use std::str::from_utf8;

use rust_decimal::Decimal;
use tiny_bank::{
    account::{AccountNumber, CheckingLimits},
    address::{Address, AddressBook},
    bank::Bank,
    bin_utils::Service,
    customer::Cpf,
    repository::{
        Repository, RepositoryError, in_memory::InMemoryRepository,
        json_file::JsonFileRepository,
    },
};

const CHECKING_SESSION: &str = "\
1
12345678901
Maria Silva
31-02-1990
15-06-1990
01310100
100
2
12345678901
1000
4
12345678901
100
1
4
12345678901
100
1
4
12345678901
100
1
4
12345678901
100
1
3
12345678901
-10
1
5
12345678901
1
6
7
";

fn address_book() -> AddressBook {
    [(
        "01310100".to_owned(),
        Address {
            street: "Avenida Paulista".to_owned(),
            district: "Bela Vista".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
        },
    )]
    .into_iter()
    .collect()
}

#[test]
fn checking_account_session() {
    let mut output = Vec::new();
    let mut repository = InMemoryRepository::default();
    let service = Service {
        input: CHECKING_SESSION.as_bytes(),
        output: &mut output,
        repository: &mut repository,
        address_lookup: Some(Box::new(address_book())),
        limits: CheckingLimits::default(),
    };
    let bank = service.run().unwrap();

    let cpf: Cpf = "12345678901".parse().unwrap();
    let customer = bank.customer(&cpf).unwrap();
    assert_eq!(customer.name(), "Maria Silva");
    assert_eq!(
        customer.birth_date(),
        chrono::NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
    );
    assert_eq!(
        customer.address(),
        "Avenida Paulista, Bela Vista - São Paulo/SP, 100"
    );
    let account = customer.account(AccountNumber::new(1)).unwrap();
    assert_eq!(account.balance(), Decimal::from(700));
    // initial deposit plus three withdrawals; the rejected ones left no trace
    assert_eq!(account.history().len(), 4);

    let text = from_utf8(&output).unwrap();
    assert!(text.contains("Invalid birth date. Use the dd-mm-yyyy format."));
    assert!(text.contains("=== Account 1 created successfully! ==="));
    assert!(text.contains("@@@ Daily limit of 3 withdrawals reached @@@"));
    assert!(text.contains("@@@ Amount must be positive, got -10 @@@"));
    assert!(text.contains("Balance:\n\tR$ 700.00"));
    assert!(text.contains("Holder:\tMaria Silva"));

    // customer, account, three withdrawals, exit
    assert_eq!(repository.saves, 6);
    assert_eq!(repository.state, Some(bank));
}

#[test]
fn failed_lookup_falls_back_to_manual_address() {
    let input = "1\n10987654321\nJoão Pereira\n01-01-1980\n99999999\nRua das Flores, 12 - Centro - Recife/PE\n";
    let mut output = Vec::new();
    let service = Service {
        input: input.as_bytes(),
        output: &mut output,
        repository: InMemoryRepository::default(),
        address_lookup: Some(Box::new(address_book())),
        limits: CheckingLimits::default(),
    };
    // end of input exits like option 7
    let bank = service.run().unwrap();

    let text = from_utf8(&output).unwrap();
    assert!(text.contains("Address lookup failed: No address found for postal code 99999999"));
    let cpf: Cpf = "10987654321".parse().unwrap();
    assert_eq!(
        bank.customer(&cpf).unwrap().address(),
        "Rua das Flores, 12 - Centro - Recife/PE"
    );
}

#[test]
fn errors_return_to_menu() {
    let input = "9\n2\n11111111111\n3\n123\n6\n7\n";
    let mut output = Vec::new();
    let service = Service {
        input: input.as_bytes(),
        output: &mut output,
        repository: InMemoryRepository::default(),
        address_lookup: None,
        limits: CheckingLimits::default(),
    };
    let bank = service.run().unwrap();
    assert!(bank.customers().is_empty());

    let text = from_utf8(&output).unwrap();
    assert!(text.contains("@@@ Invalid operation, please select one of the listed options. @@@"));
    assert!(text.contains("@@@ Customer 11111111111 not found @@@"));
    assert!(text.contains("@@@ Invalid CPF: CPF must have exactly 11 digits, got `123` @@@"));
    assert!(text.contains("@@@ No accounts registered. @@@"));
}

#[test]
fn state_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    let first = "1\n12345678901\nAna Souza\n20-07-1985\nAv. Brasil, 500\n2\n12345678901\n250.75\n7\n";

    let mut output = Vec::new();
    Service {
        input: first.as_bytes(),
        output: &mut output,
        repository: JsonFileRepository::new(&path),
        address_lookup: None,
        limits: CheckingLimits::default(),
    }
    .run()
    .unwrap();

    let mut output = Vec::new();
    let bank = Service {
        input: "2\n12345678901\n0\n7\n".as_bytes(),
        output: &mut output,
        repository: JsonFileRepository::new(&path),
        address_lookup: None,
        limits: CheckingLimits::default(),
    }
    .run()
    .unwrap();

    let cpf: Cpf = "12345678901".parse().unwrap();
    let accounts = bank.customer(&cpf).unwrap().accounts();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].balance(), Decimal::new(25075, 2));
    // the number sequence continues across runs
    assert_eq!(accounts[1].number(), AccountNumber::new(2));
}

#[test]
fn malformed_state_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let mut output = Vec::new();
    let err = Service {
        input: "7\n".as_bytes(),
        output: &mut output,
        repository: JsonFileRepository::new(&path),
        address_lookup: None,
        limits: CheckingLimits::default(),
    }
    .run()
    .unwrap_err();
    assert_eq!(err.to_string(), "Failed to load bank state");
    assert!(output.is_empty());
}

/// Fails the first `failures` saves, then behaves like the in-memory store.
#[derive(Default)]
struct UnreliableRepository {
    failures: usize,
    inner: InMemoryRepository,
}

impl Repository for UnreliableRepository {
    fn load(&mut self) -> Result<Option<Bank>, RepositoryError> {
        self.inner.load()
    }

    fn save(&mut self, bank: &Bank) -> Result<(), RepositoryError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(RepositoryError::Io {
                path: "bank.json".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.save(bank)
    }
}

#[test]
fn failed_save_is_reported_and_menu_continues() {
    let input = "1\n12345678901\nAna Souza\n20-07-1985\nAv. Brasil, 500\n6\n7\n";
    let mut output = Vec::new();
    let mut repository = UnreliableRepository {
        failures: 1,
        ..Default::default()
    };
    let bank = Service {
        input: input.as_bytes(),
        output: &mut output,
        repository: &mut repository,
        address_lookup: None,
        limits: CheckingLimits::default(),
    }
    .run()
    .unwrap();

    let text = from_utf8(&output).unwrap();
    assert!(text.contains("@@@ Failed to access `bank.json`: disk full @@@"));
    assert!(!text.contains("Customer created successfully!"));
    // the menu came back after the failure
    assert!(text.contains("@@@ No accounts registered. @@@"));

    // the customer stays registered and reaches storage with the save on exit
    let cpf: Cpf = "12345678901".parse().unwrap();
    assert!(bank.customer(&cpf).is_some());
    assert_eq!(repository.inner.saves, 1);
    assert_eq!(repository.inner.state, Some(bank));
}

