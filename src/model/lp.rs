//! CPLEX LP encoding of a model.
//!
//! Output is deterministic: variables in id order, constraints in emission
//! order, at most eight terms per line (LP readers cap line length).

use std::fmt::Write;

use super::{Model, VarId, VariableRegistry};

const TERMS_PER_LINE: usize = 8;

impl Model {
    /// Renders the model as LP text (`Minimize` / `Subject To` / `Binary`).
    pub fn to_lp(&self) -> String {
        let reg = self.registry();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "\\ shift model: {} workers x {} days, {} constraints",
            reg.num_workers(),
            reg.num_days(),
            self.constraint_count()
        );

        out.push_str("Minimize\n obj:");
        write_terms(&mut out, self.objective().expr().terms(), reg);
        out.push('\n');

        out.push_str("Subject To\n");
        for c in self.constraints() {
            let _ = write!(out, " {}:", sanitize(c.label()));
            write_terms(&mut out, c.terms(), reg);
            let _ = writeln!(out, " {} {}", c.relation().symbol(), c.rhs());
        }

        out.push_str("Binary\n");
        for (_, var) in reg.iter() {
            let _ = writeln!(out, " {}", var.name);
        }
        out.push_str("End\n");
        out
    }
}

fn write_terms(out: &mut String, terms: &[(VarId, i64)], reg: &VariableRegistry) {
    let nonzero: Vec<_> = terms.iter().filter(|&&(_, c)| c != 0).collect();
    if nonzero.is_empty() {
        match reg.get(VarId(0)) {
            Some(var) => {
                let _ = write!(out, " 0 {}", var.name);
            }
            None => out.push_str(" 0"),
        }
        return;
    }

    for (i, &&(var, coeff)) in nonzero.iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let name = reg.get(var).map_or("?", |v| v.name.as_str());
        let sign = if coeff < 0 { '-' } else { '+' };
        match coeff.abs() {
            1 => {
                let _ = write!(out, " {sign} {name}");
            }
            k => {
                let _ = write!(out, " {sign} {k} {name}");
            }
        }
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, LinearExpr, Relation};
    use crate::models::{Horizon, Weekday, WorkerId};
    use crate::objective::Objective;

    fn model() -> Model {
        let h = Horizon::new(2, Weekday::Mon);
        let reg = VariableRegistry::new(1, &h, false);
        let a = reg.work(WorkerId(0), 0).unwrap();
        let b = reg.work(WorkerId(0), 1).unwrap();
        let mut m = Model::new(h, reg);
        m.add_constraint(Constraint::new(
            "pair 0",
            LinearExpr::term(a, 2) + b,
            Relation::Le,
            LinearExpr::constant(2),
        ));
        m.set_objective(Objective::new(LinearExpr::term(a, -1) - b));
        m
    }

    #[test]
    fn test_lp_sections() {
        let lp = model().to_lp();
        assert!(lp.contains("Minimize\n obj: - work_w0_d0 - work_w0_d1\n"));
        assert!(lp.contains("Subject To\n pair_0: + 2 work_w0_d0 + work_w0_d1 <= 2\n"));
        assert!(lp.contains("Binary\n work_w0_d0\n work_w0_d1\n"));
        assert!(lp.ends_with("End\n"));
    }

    #[test]
    fn test_lp_is_deterministic() {
        assert_eq!(model().to_lp(), model().to_lp());
    }

    #[test]
    fn test_zero_objective() {
        let h = Horizon::new(1, Weekday::Mon);
        let m = Model::new(h, VariableRegistry::new(1, &h, false));
        assert!(m.to_lp().contains(" obj: 0 work_w0_d0\n"));
    }

    #[test]
    fn test_long_rows_wrap() {
        let h = Horizon::new(20, Weekday::Mon);
        let reg = VariableRegistry::new(1, &h, false);
        let row = reg.work_row(WorkerId(0)).unwrap();
        let mut m = Model::new(h, reg);
        m.add_constraint(Constraint::new(
            "month",
            LinearExpr::sum(row),
            Relation::Le,
            LinearExpr::constant(15),
        ));
        let lp = m.to_lp();
        assert!(lp.lines().all(|l| l.len() < 510));
        assert!(lp.contains("\n    + work_w0_d8"));
    }
}
