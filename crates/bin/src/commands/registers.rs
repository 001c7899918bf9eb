//! Commands that stage register operations.

use convergent::{PropertyState, PropertyValue, RegisterKind, Scalar, constants::VALUE};

use super::{open_store, parse_path, persist};
use crate::{
    cli::{AssignArgs, Cli, IncrementArgs, InitArgs, ValueArgs},
    output::print_commit,
};

/// The scalar a command line value denotes
fn scalar(value: &str) -> Scalar {
    match value.parse::<Scalar>() {
        Ok(scalar) => scalar,
        Err(never) => match never {},
    }
}

/// Run the init command
pub fn init(cli: &Cli, args: &InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;
    let kind = RegisterKind::from(args.kind);

    let mut session = store.session();
    session.add_node(&path)?;
    session.add_type(&path, kind)?;
    let outcome = session.save()?;
    persist(&store, &cli.state)?;

    print_commit(&outcome, &args.path, Some(&format!("{kind} register")), cli.format)
}

/// Run the add command
pub fn add(cli: &Cli, args: &ValueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;

    let mut session = store.session();
    session.set_add(&path, scalar(&args.value))?;
    let outcome = session.save()?;
    persist(&store, &cli.state)?;

    print_commit(&outcome, &args.path, Some(&format!("added {}", args.value)), cli.format)
}

/// Run the remove command
pub fn remove(cli: &Cli, args: &ValueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;

    let mut session = store.session();
    session.set_remove(&path, scalar(&args.value))?;
    let outcome = session.save()?;
    persist(&store, &cli.state)?;

    print_commit(&outcome, &args.path, Some(&format!("removed {}", args.value)), cli.format)
}

/// Run the update command
pub fn update(cli: &Cli, args: &ValueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;

    let mut session = store.session();
    session.register_update(&path, scalar(&args.value))?;
    let outcome = session.save()?;
    persist(&store, &cli.state)?;

    print_commit(&outcome, &args.path, Some(&format!("value {}", args.value)), cli.format)
}

/// Run the assign command
pub fn assign(cli: &Cli, args: &AssignArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;

    let values: Vec<Scalar> = args.values.iter().map(|v| scalar(v)).collect();
    let base = values
        .first()
        .map(Scalar::scalar_type)
        .ok_or("assign needs at least one value")?;
    let value = PropertyValue::array(base, values)?;
    let detail = format!("value {value}");

    let mut session = store.session();
    session.set_property(&path, PropertyState::new(VALUE, value))?;
    let outcome = session.save()?;
    persist(&store, &cli.state)?;

    print_commit(&outcome, &args.path, Some(&detail), cli.format)
}

/// Run the increment command
pub fn increment(cli: &Cli, args: &IncrementArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let path = parse_path(&args.path)?;

    let mut session = store.session();
    session.counter_increment(&path, args.delta)?;
    let outcome = session.save()?;
    persist(&store, &cli.state)?;

    print_commit(&outcome, &args.path, Some(&format!("delta {}", args.delta)), cli.format)
}
