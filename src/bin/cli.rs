use clap::{Parser, ValueEnum};
use hexmapgen::{GenerationConfig, Geography, InfrastructureTier, SeaSides, generate};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeographyArg {
    Plains,
    Mixed,
    Mountainous,
}

impl From<GeographyArg> for Geography {
    fn from(arg: GeographyArg) -> Self {
        match arg {
            GeographyArg::Plains => Geography::Plains,
            GeographyArg::Mixed => Geography::Mixed,
            GeographyArg::Mountainous => Geography::Mountainous,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TierArg {
    None,
    Basic,
    Developed,
}

impl From<TierArg> for InfrastructureTier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::None => InfrastructureTier::None,
            TierArg::Basic => InfrastructureTier::Basic,
            TierArg::Developed => InfrastructureTier::Developed,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    North,
    South,
    East,
    West,
}

impl From<SideArg> for SeaSides {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::North => SeaSides::NORTH,
            SideArg::South => SeaSides::SOUTH,
            SideArg::East => SeaSides::EAST,
            SideArg::West => SeaSides::WEST,
        }
    }
}

/// Генератор гексагональных карт с реками, поселениями и транспортной сетью
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генерации (перекрывает значение из файла)
    #[arg(short, long)]
    seed: Option<u32>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(short, long, value_enum)]
    geography: Option<GeographyArg>,

    /// Уровень инфраструктуры
    #[arg(short, long, value_enum)]
    infrastructure: Option<TierArg>,

    /// Стороны карты, уходящие в море (можно повторять; перекрывает файл)
    #[arg(long = "sea", value_enum)]
    sea_sides: Vec<SideArg>,

    /// Путь для сохранения карты в JSON
    #[arg(short, long, default_value = "map.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации из {}...", path.display());
            GenerationConfig::from_toml_file(path)?
        }
        None => GenerationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.width.is_some() {
        config.width = cli.width;
    }
    if cli.height.is_some() {
        config.height = cli.height;
    }
    if let Some(geography) = cli.geography {
        config.geography = geography.into();
    }
    if !cli.sea_sides.is_empty() {
        config.sea_sides = cli
            .sea_sides
            .iter()
            .fold(SeaSides::NONE, |sides, side| sides.with((*side).into()));
    }
    if let Some(tier) = cli.infrastructure {
        config.infrastructure = tier.into();
    }

    let (width, height) = config.dimensions();
    println!("Генерация карты (размер: {width}×{height}, сид: {})...", config.seed);
    let map = generate(&config)?;

    println!("Сохранение в {}", cli.output.display());
    let writer = BufWriter::new(File::create(&cli.output)?);
    serde_json::to_writer(writer, &map)?;

    println!("\nГотово!");
    for (terrain, count) in map.terrain_histogram() {
        println!("  {terrain:?}: {count}");
    }
    println!(
        "  Реки: {}, поселения: {}, узлы снабжения: {}",
        map.rivers.len(),
        map.urban_clusters.len(),
        map.supply_hubs.len()
    );
    println!(
        "  Дороги: {} участков, железные дороги: {} участков",
        map.roads.len(),
        map.railways.len()
    );
    Ok(())
}
