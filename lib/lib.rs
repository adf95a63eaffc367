#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate serde;

pub mod ddg;
pub mod graph;
pub mod machine;
pub mod program;

pub mod error {
    error_chain! {
        types {
            Error, ErrorKind, ResultExt, Result;
        }

        errors {
            IllegalProgram(m: String) {
                description("The input program is structurally invalid")
                display("Illegal program: {}", m)
            }
            IllegalMachine(m: String) {
                description("The machine description lacks a required feature")
                display("Illegal machine: {}", m)
            }
            Graph(m: String) {
                description("An error in graph bookkeeping")
                display("Graph error: {}", m)
            }
        }
    }
}
