//! Text rendering of sweep results.

use crate::{suite::Section, Result};
use std::{collections::BTreeMap, fmt, fs, path::Path, time::Duration};

const WIDTH: usize = 80;

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(WIDTH);
    format!("{rule}\n{title:^width$}\n{rule}", width = WIDTH)
}

fn micros(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e6
}

fn implementations(section: &Section) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for outcome in &section.outcomes {
        for standing in &outcome.results {
            if !names.contains(&standing.implementation.as_str()) {
                names.push(&standing.implementation);
            }
        }
    }
    names
}

/// A section rendered as rows of operations against columns of
/// implementations.
struct Table<'a>(&'a Section);

impl Table<'_> {
    fn header(f: &mut fmt::Formatter<'_>, title: &str, names: &[&str]) -> fmt::Result {
        write!(f, "{title:<20}")?;
        for name in names {
            write!(f, " | {name:>12}")?;
        }
        Ok(())
    }

    fn slowdowns(&self, f: &mut fmt::Formatter<'_>, names: &[&str]) -> fmt::Result {
        let section = self.0;
        writeln!(f)?;
        Self::header(f, "Collision slowdown", names)?;
        writeln!(f)?;
        for outcome in &section.outcomes {
            write!(f, "{:<20}", outcome.operation.name())?;
            for name in names {
                let slowdown = section
                    .slowdowns
                    .iter()
                    .find(|s| s.operation == outcome.operation && s.implementation == *name);
                match slowdown {
                    Some(slowdown) => write!(f, " | {:>11.2}x", slowdown.factor())?,
                    None => write!(f, " | {:>12}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = self.0;
        let names = implementations(section);
        writeln!(f, "--- {} ---", section.descriptor)?;
        Self::header(f, "Benchmark", &names)?;
        writeln!(f, " | Winner")?;
        writeln!(f, "{}", "-".repeat(WIDTH))?;

        for outcome in &section.outcomes {
            write!(f, "{:<20}", outcome.operation.name())?;
            for name in &names {
                match outcome.results.iter().find(|s| s.implementation == *name) {
                    Some(standing) => write!(f, " | {:>10.2}us", micros(standing.aggregate))?,
                    None => write!(f, " | {:>12}", "-")?,
                }
            }
            write!(f, " | {}", outcome.winner)?;
            if outcome.significant {
                write!(f, " ({:.2}x faster)", outcome.ratio)?;
            }
            writeln!(f)?;
        }
        if !section.slowdowns.is_empty() {
            self.slowdowns(f, &names)?;
        }
        Ok(())
    }
}

/// One table for a section: a row per operation, a column per implementation.
///
/// Collision sections get a second table of slowdown factors against
/// sequential keys of the same size.
pub fn render_section(section: &Section) -> String {
    Table(section).to_string()
}

/// Every measured cell keyed by a flat name, sorted by name.
pub fn flat_results(sections: &[Section]) -> BTreeMap<String, Duration> {
    sections
        .iter()
        .flat_map(|section| section.results.iter())
        .map(|result| {
            let name = format!(
                "{}_{}_{}_{}",
                result.operation.slug(),
                result.descriptor.distribution,
                result.descriptor.size,
                result.implementation
            );
            (name, result.aggregate)
        })
        .collect()
}

/// Write `name: duration` lines (microseconds), sorted by name.
pub fn write_results(path: &Path, sections: &[Section]) -> Result<()> {
    let out: String = flat_results(sections)
        .into_iter()
        .map(|(name, aggregate)| format!("{name}: {:.2} μs\n", micros(aggregate)))
        .collect();
    fs::write(path, out)?;
    Ok(())
}

/// The fastest and slowest measured cells.
pub fn extremes(sections: &[Section]) -> Option<((String, Duration), (String, Duration))> {
    let flat = flat_results(sections);
    let fastest = flat.iter().min_by_key(|(_, d)| **d)?;
    let slowest = flat.iter().max_by_key(|(_, d)| **d)?;
    Some((
        (fastest.0.clone(), *fastest.1),
        (slowest.0.clone(), *slowest.1),
    ))
}

pub fn render_extremes(sections: &[Section]) -> Option<String> {
    let ((fast, fast_d), (slow, slow_d)) = extremes(sections)?;
    Some(format!(
        "Fastest operation: {fast} ({:.2} μs)\nSlowest operation: {slow} ({:.2} μs)",
        micros(fast_d),
        micros(slow_d)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::{BenchmarkResult, ComparisonOutcome, Standing},
        catalog::Operation,
        collision::CollisionMode,
        stats::Summary,
        suite::Slowdown,
        workload::{Descriptor, Distribution, KeyType},
    };

    fn descriptor() -> Descriptor {
        Descriptor {
            distribution: Distribution::Keys(KeyType::Sequential),
            size: 1000,
            seed: None,
        }
    }

    fn result(operation: Operation, implementation: &str, micros: u64) -> BenchmarkResult {
        let aggregate = Duration::from_micros(micros);
        BenchmarkResult {
            operation,
            implementation: implementation.to_string(),
            descriptor: descriptor(),
            aggregate,
            summary: Summary {
                mean: aggregate,
                min: aggregate,
                max: aggregate,
                std_dev: Duration::ZERO,
                count: 1,
            },
            raw: None,
        }
    }

    fn section() -> Section {
        let results = vec![
            result(Operation::Creation, "std", 500),
            result(Operation::Creation, "hashbrown", 250),
            result(Operation::Deletion, "std", 100),
            result(Operation::Deletion, "hashbrown", 100),
        ];
        let outcome = |operation, winner: &str, ratio, significant| ComparisonOutcome {
            operation,
            descriptor: descriptor(),
            results: results
                .iter()
                .filter(|r| r.operation == operation)
                .map(|r| Standing {
                    implementation: r.implementation.clone(),
                    aggregate: r.aggregate,
                })
                .collect(),
            winner: winner.to_string(),
            ratio,
            significant,
        };
        Section {
            descriptor: descriptor(),
            outcomes: vec![
                outcome(Operation::Creation, "hashbrown", 2.0, true),
                outcome(Operation::Deletion, "std", 1.0, false),
            ],
            results,
            slowdowns: Vec::new(),
        }
    }

    #[test]
    fn test_render_section() {
        let table = render_section(&section());
        assert!(table.contains("sequential n=1000"));
        let creation = table.lines().find(|l| l.starts_with("Creation")).unwrap();
        assert!(creation.contains("500.00us"));
        assert!(creation.ends_with("hashbrown (2.00x faster)"));
        let deletion = table.lines().find(|l| l.starts_with("Deletion")).unwrap();
        assert!(deletion.ends_with("| std"));
    }

    #[test]
    fn test_render_collision_slowdown() {
        let mut collided = section();
        collided.descriptor.distribution = Distribution::Collision(CollisionMode::Constant);
        collided.slowdowns = vec![Slowdown {
            operation: Operation::Creation,
            implementation: "std".into(),
            collision: Duration::from_micros(500),
            baseline: Duration::from_micros(100),
        }];
        let table = render_section(&collided);
        assert!(table.contains("collide-constant n=1000"));
        let (_, slowdowns) = table.split_once("Collision slowdown").unwrap();
        let creation = slowdowns
            .lines()
            .find(|l| l.starts_with("Creation"))
            .unwrap();
        assert!(creation.contains("5.00x"));
        assert!(creation.ends_with("-"));
        assert!(!render_section(&section()).contains("Collision slowdown"));
    }

    #[test]
    fn test_results_file_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        write_results(&path, &[section()]).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert_eq!(lines[0], "creation_sequential_1000_hashbrown: 250.00 μs");
    }

    #[test]
    fn test_extremes() {
        let ((fast, _), (slow, slow_d)) = extremes(&[section()]).unwrap();
        assert!(fast.starts_with("delete_"));
        assert_eq!(slow, "creation_sequential_1000_std");
        assert_eq!(slow_d, Duration::from_micros(500));
        assert!(extremes(&[]).is_none());
    }
}
