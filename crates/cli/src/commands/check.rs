use clap::Args;

use super::common::{GeneratorArgs, run_generator};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,
}

pub fn run(args: CheckArgs) -> i32 {
    match run_generator(&args.generator) {
        Ok((_, generated)) => {
            for (kind, api) in &generated {
                let methods: usize = api.interfaces.iter().map(|i| i.methods.len()).sum();
                println!(
                    "{kind}: {} interfaces, {methods} methods",
                    api.interfaces.len()
                );
            }
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
