use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ncaa_hoops::dataset::read_game_rows;
use ncaa_hoops::pipeline::{AnalysisOptions, run_analysis};
use ncaa_hoops::regression::{add_constant, fit_ols};
use ncaa_hoops::team_names::clean_team_name;

const TEAMS: usize = 64;

fn synthetic_season(games: usize) -> String {
    let mut csv = String::from("index,GAME_ID,Team_Name,1st Half,2nd Half,1st OT,2nd OT,3rd OT,Total\n");
    for g in 0..games {
        let home = g % TEAMS;
        let away = (g * 7 + 3) % TEAMS;
        let away = if away == home { (away + 1) % TEAMS } else { away };
        let h1 = 25 + (g * 13 % 20);
        let a1 = 25 + (g * 17 % 20);
        let h2 = 25 + (g * 11 % 22);
        let a2 = 25 + (g * 19 % 22);
        csv.push_str(&format!(
            "1,{g},#{} Team {home} ({}-{}),{h1},{h2},,,,{}\n",
            home % 25 + 1,
            g % 30,
            g % 9,
            h1 + h2
        ));
        csv.push_str(&format!(
            "2,{g},Team {away} ({}-{}),{a1},{a2},,,,{}\n",
            g % 28,
            g % 11,
            a1 + a2
        ));
    }
    csv
}

fn bench_full_analysis(c: &mut Criterion) {
    let raw = synthetic_season(5_000);
    let rows = read_game_rows(raw.as_bytes()).expect("synthetic csv parses");
    c.bench_function("run_analysis_5k_games", |b| {
        b.iter(|| {
            let report = run_analysis(black_box(&rows), AnalysisOptions::default()).unwrap();
            black_box(report.halftime.probability);
        })
    });
}

fn bench_csv_read(c: &mut Criterion) {
    let raw = synthetic_season(5_000);
    c.bench_function("read_game_rows_5k_games", |b| {
        b.iter(|| {
            let rows = read_game_rows(black_box(raw.as_bytes())).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_team_names(c: &mut Criterion) {
    let names = [
        "#3 Duke (28-5)",
        "Kansas (15-2)",
        "#12 Saint Mary's (26-7)",
        "Texas A&M-CC",
    ];
    c.bench_function("clean_team_name", |b| {
        b.iter(|| {
            for name in names {
                black_box(clean_team_name(black_box(name)));
            }
        })
    });
}

fn bench_ols(c: &mut Criterion) {
    let x: Vec<f64> = (0..TEAMS).map(|i| 1500.0 + (i * 37 % 400) as f64).collect();
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, v)| (v - 1500.0) / 4.0 + (i % 5) as f64)
        .collect();
    let exog = add_constant(vec![("Total_Points".to_string(), x)], y.len());
    c.bench_function("fit_ols_64_teams", |b| {
        b.iter(|| {
            let fit = fit_ols("Winning_Percentage", black_box(&y), black_box(&exog)).unwrap();
            black_box(fit.r_squared);
        })
    });
}

criterion_group!(
    perf,
    bench_full_analysis,
    bench_csv_read,
    bench_team_names,
    bench_ols
);
criterion_main!(perf);
