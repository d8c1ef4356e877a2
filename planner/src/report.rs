//! Text tables and JSON output for command results.

use std::fmt;

use glidepath::{
    Allocation, AssetClass, FundConfig, FundReport, Period, PerformanceReport, RebalanceOutcome,
    RebalancePlan,
};
use serde::Serialize;

use crate::error::Result;
use crate::store::FundSummary;

/// JSON envelope for `--json` output.
#[derive(Serialize)]
struct JsonOut<'a, T: ?Sized> {
    ok: bool,
    data: &'a T,
}

/// Print `data` as JSON, or its text rendering.
pub fn print_one<T: Serialize + ?Sized>(
    json: bool,
    data: &T,
    text: impl Fn(&T) -> String,
) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        print!("{}", text(data));
    }
    Ok(())
}

/// Fund listing.
pub struct FundList<'a>(pub &'a [FundSummary]);

impl fmt::Display for FundList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No funds.");
        }
        writeln!(f, "  {:24} Name", "Id")?;
        for fund in self.0 {
            writeln!(f, "  {:24} {}", fund.id, fund.name)?;
        }
        Ok(())
    }
}

/// Fund configuration: per-class fund weights and the glide path rows.
pub struct ConfigView<'a> {
    pub fund_id: &'a str,
    pub config: &'a FundConfig,
}

impl fmt::Display for ConfigView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        writeln!(f, "FUND {} ({})", self.fund_id, config.fund_name)?;
        writeln!(f, "  Birth year: {}", config.birth_year)?;

        writeln!(f, "\nFUNDS:")?;
        for (class, funds) in &config.asset_classes {
            if funds.is_empty() {
                writeln!(f, "  {:24} (none)", class.display_name())?;
                continue;
            }
            for (i, fw) in funds.iter().enumerate() {
                let label = if i == 0 { class.display_name() } else { "" };
                writeln!(f, "  {:24} {:8} {:>7.2}%", label, fw.symbol, fw.percentage)?;
            }
        }

        writeln!(f, "\nGLIDE PATH:")?;
        if config.glide_path.is_empty() {
            return writeln!(f, "  (empty)");
        }
        let mut rows: Vec<_> = config.glide_path.iter().collect();
        rows.sort_by_key(|e| e.age);
        let classes = glidepath::glide_path::asset_classes(&config.glide_path);
        write_allocation_header(f, &classes)?;
        for entry in rows {
            write_allocation_row(f, entry.age, &entry.allocations, &classes)?;
        }
        Ok(())
    }
}

/// Allocation by age over a range of ages.
pub struct ScheduleTable<'a>(pub &'a [(i32, Allocation)]);

impl fmt::Display for ScheduleTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((_, first)) = self.0.first() else {
            return writeln!(f, "Glide path is empty.");
        };
        let classes: Vec<AssetClass> = first.keys().cloned().collect();
        writeln!(f, "GLIDE PATH SCHEDULE:")?;
        write_allocation_header(f, &classes)?;
        for (age, allocation) in self.0 {
            write_allocation_row(f, *age, allocation, &classes)?;
        }
        Ok(())
    }
}

fn write_allocation_header(f: &mut fmt::Formatter<'_>, classes: &[AssetClass]) -> fmt::Result {
    write!(f, "  {:>4}", "Age")?;
    for class in classes {
        write!(f, " {:>16}", class)?;
    }
    writeln!(f)
}

fn write_allocation_row(
    f: &mut fmt::Formatter<'_>,
    age: i32,
    allocation: &Allocation,
    classes: &[AssetClass],
) -> fmt::Result {
    write!(f, "  {:>4}", age)?;
    for class in classes {
        let pct = allocation.get(class).copied().unwrap_or(0.0);
        write!(f, " {:>15.2}%", pct)?;
    }
    writeln!(f)
}

/// Contribution plan: target, per-fund amounts, and outcome.
pub struct PlanTable<'a>(pub &'a RebalancePlan);

impl fmt::Display for PlanTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        writeln!(
            f,
            "Age {}: ${:.2} to invest, ${:.2} total after contribution",
            plan.age, plan.cash_to_invest, plan.total_value
        )?;

        writeln!(f, "\nTARGET ALLOCATION:")?;
        if plan.target.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (class, pct) in &plan.target {
            writeln!(f, "  {:24} {:>7.2}%", class.display_name(), pct)?;
        }

        if !plan.funds.is_empty() {
            writeln!(f, "\nCONTRIBUTION PLAN:")?;
            writeln!(
                f,
                "  {:8} {:>12} {:>12} {:>12} {:>12}",
                "Symbol", "Current", "Desired", "Needed", "Invest"
            )?;
            for fund in &plan.funds {
                writeln!(
                    f,
                    "  {:8} ${:>11.2} ${:>11.2} ${:>11.2} ${:>11.2}",
                    fund.symbol, fund.current, fund.desired, fund.needed, fund.invest,
                )?;
            }
        }

        match plan.outcome {
            RebalanceOutcome::Invest => writeln!(
                f,
                "\n  Invest ${:.2} across {} fund(s).",
                plan.total_invested(),
                plan.funds.iter().filter(|p| p.invest > 0.0).count()
            ),
            other => writeln!(f, "\n  Nothing to invest: {other}."),
        }
    }
}

/// Per-fund and overall returns.
pub struct PerformanceTable<'a>(pub &'a PerformanceReport);

impl fmt::Display for PerformanceTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "PERFORMANCE (age {}):", report.age)?;
        writeln!(
            f,
            "  {:8} {:>10} {:>10} {:>9} {:>8} {:>7}",
            "Symbol", "Price", "PrevClose", "Change", "Change%", "Alloc%"
        )?;
        for fund in &report.funds {
            match fund {
                FundReport::Available(p) => writeln!(
                    f,
                    "  {:8} {:>10.2} {:>10.2} {:>+9.2} {:>+7.2}% {:>6.2}%",
                    p.symbol,
                    p.current_price,
                    p.previous_close,
                    p.daily_change,
                    p.daily_change_pct,
                    p.allocation_pct,
                )?,
                FundReport::Unavailable {
                    symbol,
                    allocation_pct,
                    reason,
                } => writeln!(
                    f,
                    "  {:8} {:>47.2}%   unavailable: {reason}",
                    symbol, allocation_pct
                )?,
            }
        }

        writeln!(f, "\nRETURNS (%):")?;
        write!(f, "  {:8}", "")?;
        for period in Period::ALL {
            write!(f, " {:>7}", period)?;
        }
        writeln!(f)?;
        for fund in &report.funds {
            if let Some(returns) = fund.returns() {
                write!(f, "  {:8}", fund.symbol())?;
                for period in Period::ALL {
                    let r = returns.get(&period).copied().unwrap_or_default();
                    write!(f, " {:>7}", r)?;
                }
                writeln!(f)?;
            }
        }
        write!(f, "  {:8}", "Overall")?;
        for period in Period::ALL {
            let r = report
                .overall_returns
                .get(&period)
                .copied()
                .unwrap_or_default();
            write!(f, " {:>7}", r)?;
        }
        writeln!(f)
    }
}
