//! Minimal `{{key}}` substitution for the generated control files, plus the
//! built-in boilerplate for each of them.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template '{template}' references unknown placeholder '{key}'")]
    UnknownPlaceholder { template: String, key: String },
    #[error("Template '{template}' has an unterminated placeholder at byte {offset}")]
    Unterminated { template: String, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitutes every `{{key}}` (surrounding spaces allowed) from `vars`.
    pub fn render(&self, vars: &BTreeMap<&str, String>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        let mut consumed = 0;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                return Err(TemplateError::Unterminated {
                    template: self.name.clone(),
                    offset: consumed + start,
                });
            };

            let key = after_open[..end].trim();
            let value = vars
                .get(key)
                .ok_or_else(|| TemplateError::UnknownPlaceholder {
                    template: self.name.clone(),
                    key: key.to_string(),
                })?;
            out.push_str(value);

            let advance = start + 2 + end + 2;
            consumed += advance;
            rest = &rest[advance..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

pub const MMGBSA_PARAMETERS: &str = r#"Input file generated by gmxflow for {{name}}
&general
sys_name="{{name}}",
startframe=1,
endframe=9999999,
interval=1,
verbose=2,
/
&gb
igb=5, saltcon=0.150,
/
&decomp
idecomp=2, dec_verbose=3,
print_res="within 4",
/
"#;

pub const MMGBSA_RUN_SCRIPT: &str = r#"#!/bin/bash
# Free-energy estimation for {{name}}, generated by gmxflow.
#SBATCH --job-name={{name}}
#SBATCH --nodes=1
#SBATCH --ntasks=8

set -euo pipefail
cd "$(dirname "$0")"

mpirun -np 8 gmx_MMPBSA MPI -O \
    -i {{parameter_file}} \
    -cs {{structure}} \
    -ci {{index}} \
    -cg 1 13 \
    -ct {{trajectory}} \
    -cp {{topology}} \
    -o FINAL_RESULTS_MMPBSA.dat \
    -eo FINAL_RESULTS_MMPBSA.csv \
    -nogui
"#;

pub const TABLE_LOADER: &str = r#"# Loader for the analysis tables of {{name}}, generated by gmxflow.
import glob
import os
import pickle

import pandas as pd

HERE = os.path.dirname(os.path.abspath(__file__))


def load_tables(path=HERE):
    tables = {}
    for csv_path in sorted(glob.glob(os.path.join(path, "*.{{extension}}"))):
        key = os.path.splitext(os.path.basename(csv_path))[0]
        try:
            tables[key] = pd.read_csv(csv_path, header=None)
        except Exception as exc:
            print(f"Skipping {csv_path}: {exc}")
    return tables


def load_blob(path=HERE, filename="{{blob}}"):
    with open(os.path.join(path, filename), "rb") as handle:
        return {k: pd.DataFrame(v) for k, v in pickle.load(handle).items()}


if __name__ == "__main__":
    for key, frame in load_tables().items():
        print(key, frame.shape)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn substitutes_all_occurrences() {
        let template = Template::new("t", "a={{ name }}, b={{name}}!");
        let out = template.render(&vars(&[("name", "lysozyme")])).unwrap();
        assert_eq!(out, "a=lysozyme, b=lysozyme!");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let template = Template::new("t", "{{name}} {{other}}");
        let err = template.render(&vars(&[("name", "x")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                template: "t".into(),
                key: "other".into()
            }
        );
    }

    #[test]
    fn unterminated_placeholder_reports_offset() {
        let template = Template::new("t", "ok {{a}} then {{broken");
        let err = template.render(&vars(&[("a", "1")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unterminated {
                template: "t".into(),
                offset: 14
            }
        );
    }

    #[test]
    fn parameter_template_renders_with_name_only() {
        let out = Template::new("mmgbsa.in", MMGBSA_PARAMETERS)
            .render(&vars(&[("name", "complex-A")]))
            .unwrap();
        assert!(out.contains("sys_name=\"complex-A\""));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let template = Template::new("t", "plain } { text");
        assert_eq!(template.render(&BTreeMap::new()).unwrap(), "plain } { text");
    }
}
