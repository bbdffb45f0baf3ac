use crate::cli::MmpbsaArgs;
use crate::error::Result;
use gmxflow::core::mmpbsa;
use gmxflow::engine::error::EngineError;
use tracing::info;

pub fn run(args: MmpbsaArgs) -> Result<()> {
    if !args.input.is_file() {
        return Err(EngineError::MissingInput {
            kind: "MMPBSA results",
            path: args.input,
        }
        .into());
    }

    info!("Converting {:?}", &args.input);
    let output = mmpbsa::convert_file(&args.input).map_err(EngineError::from)?;
    println!("✓ Energy table written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use tempfile::tempdir;

    const RESULTS: &str = "\
Delta (Complex - Receptor - Ligand):
Energy Component            Average     SD(Prop.)         SD   SEM(Prop.)        SEM
-------------------------------------------------------------------------------------
ΔTOTAL                     -30.5000        4.0000     4.0000       0.4000     0.4000
";

    #[test]
    fn results_file_is_converted_next_to_itself() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("FINAL_RESULTS_MMPBSA.dat");
        fs::write(&input, RESULTS).unwrap();

        run(MmpbsaArgs { input }).unwrap();

        let csv = fs::read_to_string(dir.path().join("FINAL_RESULTS_MMPBSA.csv")).unwrap();
        assert_eq!(
            csv,
            "System,Energy_Component,Average,SD(Prop.),SD,SEM(Prop.),SEM\n\
             Delta,ΔTOTAL,-30.5,4.0,4.0,0.4,0.4\n"
        );
    }

    #[test]
    fn missing_results_file_is_reported() {
        let dir = tempdir().unwrap();

        let result = run(MmpbsaArgs {
            input: dir.path().join("FINAL_RESULTS_MMPBSA.dat"),
        });

        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::MissingInput { .. }))
        ));
    }
}
