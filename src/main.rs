extern crate copperline;
extern crate env_logger;
extern crate log;
extern crate tricommand;

use std::io::{self, IsTerminal};
use std::process;

use log::error;
use tricommand::{CommandLoop, StreamSource};

fn main() {
    env_logger::init();

    let result = if io::stdin().is_terminal() {
        CommandLoop::new(copperline::Copperline::new(), io::stdout()).run()
    } else {
        CommandLoop::new(StreamSource::new(io::stdin().lock()), io::stdout()).run()
    };

    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}
