use crate::amount::round_currency;
use crate::split::Split;

use std::fmt;

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paid = round_currency(self.paid()).map_err(|_| fmt::Error)?;
        writeln!(f, "Paid: {}", paid)?;

        let rounded = self.rounded();
        let width = rounded.totals().keys().map(|p| p.len()).max().unwrap_or(0);

        writeln!(f, "Totals:")?;
        for (person, total) in rounded.totals() {
            writeln!(f, "  {:<width$}  {:>10}", person, total, width = width)?;
        }
        if let Some(adjustment) = rounded.adjustment() {
            writeln!(
                f,
                "Rounding: {} adjusted by {}",
                adjustment.person, -adjustment.delta
            )?;
        }

        writeln!(f, "Breakdown:")?;
        for (person, items) in self.allocation().breakdown() {
            writeln!(f, "  {}", person)?;
            for (item, share) in items {
                let share = round_currency(share).map_err(|_| fmt::Error)?;
                writeln!(f, "    {}: {}", item, share)?;
            }
        }
        Ok(())
    }
}
