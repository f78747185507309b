use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{info, warn};

use catalog_common::compression::is_snapshot;
use catalog_common::Difficulty;
use catalog_filter::{
    parse_dataset, Catalog, FilterCriteria, LoadReport, Session, SessionConfig, SortColumn, SortDirection,
    SortState, StatusFilter,
};

mod storage;

use storage::FileStorage;

const DEFAULT_STATE_DIR: &str = ".catalog-state";

fn main() {
    let matches = cli().get_matches();

    init_logging(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}

// 设置命令行参数
fn cli() -> Command {
    Command::new("题库浏览器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("在命令行中筛选、排序、分页浏览题库，并记录完成状态")
        .subcommand_required(true)
        .arg(Arg::new("data")
            .short('d')
            .long("data")
            .value_name("FILE")
            .help("题库数据文件（JSON 数组或 pack 生成的快照）")
            .global(true))
        .arg(Arg::new("state_dir")
            .long("state-dir")
            .value_name("DIR")
            .help("完成状态的保存目录")
            .default_value(DEFAULT_STATE_DIR)
            .global(true))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细日志（-vv 显示调试日志）")
            .action(ArgAction::Count)
            .global(true))
        .subcommand(with_filter_args(Command::new("query")
            .about("显示筛选、排序后的一页题目"))
            .arg(Arg::new("page")
                .short('p')
                .long("page")
                .value_name("N")
                .help("页码")
                .value_parser(clap::value_parser!(usize))
                .default_value("1"))
            .arg(Arg::new("page_size")
                .long("page-size")
                .value_name("N")
                .help("每页条数")
                .value_parser(clap::value_parser!(usize)))
            .arg(Arg::new("json")
                .long("json")
                .help("以JSON输出当前页")
                .action(ArgAction::SetTrue)))
        .subcommand(Command::new("solve")
            .about("切换题目的完成状态")
            .arg(Arg::new("ids")
                .value_name("PROBLEM_ID")
                .help("题目ID")
                .required(true)
                .num_args(1..)))
        .subcommand(with_filter_args(Command::new("stats")
            .about("显示完成进度和题库洞察"))
            .arg(Arg::new("json")
                .long("json")
                .help("以JSON输出")
                .action(ArgAction::SetTrue)))
        .subcommand(with_filter_args(Command::new("export")
            .about("将筛选结果导出为JSON文件"))
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("导出目录")
                .default_value(".")))
        .subcommand(Command::new("pack")
            .about("校验数据集并写成压缩快照")
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("快照输出路径")
                .required(true)))
}

// 筛选和排序参数，query、stats、export 共用
fn with_filter_args(command: Command) -> Command {
    command
        .arg(Arg::new("search")
            .short('s')
            .long("search")
            .value_name("TEXT")
            .help("按标题或题目ID搜索"))
        .arg(Arg::new("status")
            .long("status")
            .value_name("STATUS")
            .help("完成状态: any、solved、unsolved")
            .default_value("any"))
        .arg(Arg::new("difficulty")
            .long("difficulty")
            .value_name("LEVEL")
            .help("难度，可重复")
            .action(ArgAction::Append))
        .arg(Arg::new("tag")
            .short('t')
            .long("tag")
            .value_name("TAG")
            .help("标签，命中任意一个即可，可重复")
            .action(ArgAction::Append))
        .arg(Arg::new("company")
            .short('c')
            .long("company")
            .value_name("COMPANY")
            .help("公司，命中任意一个即可，可重复")
            .action(ArgAction::Append))
        .arg(Arg::new("min_companies")
            .long("min-companies")
            .value_name("N")
            .help("最少公司数量")
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i64)))
        .arg(Arg::new("min_frequency")
            .long("min-frequency")
            .value_name("F")
            .help("最低加权频率")
            .value_parser(clap::value_parser!(f64)))
        .arg(Arg::new("sort")
            .long("sort")
            .value_name("COLUMN")
            .help("排序列: problem_id、title、difficulty、company_count、weighted_frequency"))
        .arg(Arg::new("ascending")
            .long("ascending")
            .help("升序排序")
            .action(ArgAction::SetTrue))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(matches: &ArgMatches) -> Result<()> {
    let data = PathBuf::from(required(matches, "data")?);
    let state_dir = PathBuf::from(required(matches, "state_dir")?);

    match matches.subcommand() {
        Some(("query", sub)) => query(sub, &data, &state_dir),
        Some(("solve", sub)) => solve(sub, &data, &state_dir),
        Some(("stats", sub)) => stats(sub, &data, &state_dir),
        Some(("export", sub)) => export(sub, &data, &state_dir),
        Some(("pack", sub)) => pack(sub, &data),
        _ => bail!("缺少子命令"),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| anyhow!("缺少参数 --{}", name.replace('_', "-")))
}

// 读取数据集，根据魔数区分快照和JSON
fn load_report(path: &Path) -> Result<LoadReport> {
    let bytes = fs::read(path).with_context(|| format!("无法读取数据文件 {}", path.display()))?;

    let report = if is_snapshot(&bytes) {
        Catalog::from_snapshot(&bytes).with_context(|| format!("无法解析快照 {}", path.display()))?
    } else {
        let json = String::from_utf8(bytes).with_context(|| format!("数据文件不是有效的UTF-8 {}", path.display()))?;
        parse_dataset(&json).with_context(|| format!("无法解析数据集 {}", path.display()))?
    };

    info!(
        "已加载 {} 道题目，丢弃 {} 条记录，共 {} 条警告",
        report.catalog.len(),
        report.rejected_count(),
        report.warnings.len()
    );
    Ok(report)
}

fn open_session(data: &Path, state_dir: &Path, config: SessionConfig) -> Result<Session<FileStorage>> {
    let report = load_report(data)?;
    Ok(Session::new(report, FileStorage::new(state_dir), config)?)
}

fn criteria_from(matches: &ArgMatches, config: &SessionConfig) -> Result<FilterCriteria> {
    let strings = |name: &str| -> Vec<String> {
        matches
            .get_many::<String>(name)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    let difficulties = strings("difficulty")
        .iter()
        .map(|value| value.parse::<Difficulty>().map_err(anyhow::Error::msg))
        .collect::<Result<_>>()?;
    let status = match matches.get_one::<String>("status") {
        Some(value) => value.parse::<StatusFilter>().map_err(anyhow::Error::msg)?,
        None => StatusFilter::Any,
    };

    Ok(FilterCriteria {
        search_text: matches.get_one::<String>("search").cloned().unwrap_or_default(),
        status,
        difficulties,
        tags: strings("tag").into_iter().collect(),
        companies: strings("company").into_iter().collect(),
        min_company_count: matches
            .get_one::<i64>("min_companies")
            .copied()
            .unwrap_or(config.default_min_company_count),
        min_frequency: matches
            .get_one::<f64>("min_frequency")
            .copied()
            .unwrap_or(config.default_min_frequency),
    })
}

fn sort_from(matches: &ArgMatches) -> Result<SortState> {
    let Some(column) = matches.get_one::<String>("sort") else {
        return Ok(SortState::default());
    };
    let column: SortColumn = column.parse()?;
    let direction = if matches.get_flag("ascending") {
        SortDirection::Ascending
    } else {
        SortDirection::Descending
    };
    Ok(SortState { column, direction })
}

// 按命令行参数打开会话并应用筛选和排序
fn filtered_session(matches: &ArgMatches, data: &Path, state_dir: &Path, config: SessionConfig) -> Result<Session<FileStorage>> {
    let criteria = criteria_from(matches, &config)?;
    let sort = sort_from(matches)?;

    let mut session = open_session(data, state_dir, config)?;
    session.set_criteria(criteria);
    session.set_sort(sort);
    Ok(session)
}

fn query(matches: &ArgMatches, data: &Path, state_dir: &Path) -> Result<()> {
    let mut config = SessionConfig::default();
    if let Some(&page_size) = matches.get_one::<usize>("page_size") {
        config.page_size = page_size;
    }
    config.validate()?;

    let mut session = filtered_session(matches, data, state_dir, config)?;
    let page = matches.get_one::<usize>("page").copied().unwrap_or(1);
    if page != 1 {
        session.go_to_page(page)?;
    }

    let view = session.view();
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.items.is_empty() {
        println!("没有符合条件的题目");
        return Ok(());
    }

    println!("{:<3} {:<8} {:<40} {:<7} {:>5} {:>9}", "", "ID", "标题", "难度", "公司", "频率");
    for item in &view.items {
        let record = item.record;
        println!(
            "{:<3} {:<8} {:<40} {:<7} {:>5} {:>9.2}",
            if item.solved { "[x]" } else { "[ ]" },
            record.problem_id,
            truncate(&record.title, 40),
            record.difficulty.as_str(),
            record.company_count,
            record.weighted_frequency
        );
    }
    println!(
        "第 {}/{} 页，共 {} 道题目（按 {} {}）",
        view.current_page,
        view.total_pages,
        view.filtered_count,
        view.sort.column,
        match view.sort.direction {
            SortDirection::Ascending => "升序",
            SortDirection::Descending => "降序",
        }
    );
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

fn solve(matches: &ArgMatches, data: &Path, state_dir: &Path) -> Result<()> {
    let mut session = open_session(data, state_dir, SessionConfig::default())?;

    let ids: Vec<&String> = matches.get_many::<String>("ids").map(|ids| ids.collect()).unwrap_or_default();
    for id in ids {
        if !session.catalog().contains(id) {
            warn!("题库中没有题目 {}", id);
        }
        let solved = session.toggle_solved(id);
        println!("{} {}", id, if solved { "已完成" } else { "未完成" });
    }

    let stats = session.statistics();
    println!("已完成 {}/{} ({:.1}%)", stats.solved_problems, stats.total_problems, stats.completion_rate);
    Ok(())
}

fn stats(matches: &ArgMatches, data: &Path, state_dir: &Path) -> Result<()> {
    let session = filtered_session(matches, data, state_dir, SessionConfig::default())?;
    let stats = session.statistics();
    let insights = session.insights();

    if matches.get_flag("json") {
        let document = serde_json::json!({ "statistics": stats, "insights": insights });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("题目总数: {}", stats.total_problems);
    println!("已完成: {} ({:.1}%)", stats.solved_problems, stats.completion_rate);
    println!("  简单 {} / 中等 {} / 困难 {}", stats.solved_easy, stats.solved_medium, stats.solved_hard);
    println!("公司数: {}", stats.unique_companies);
    println!("筛选结果: {}", stats.filtered_problems);

    println!("\n难度分布:");
    for entry in &insights.difficulty_distribution {
        println!("  {:<7} {}", entry.difficulty.as_str(), entry.count);
    }
    println!("\n热门标签:");
    for tag in &insights.top_tags {
        println!("  {:<30} {}", tag.value, tag.count);
    }
    println!("\n热门公司:");
    for company in &insights.top_companies {
        println!("  {:<30} {}", company.value, company.count);
    }
    Ok(())
}

fn export(matches: &ArgMatches, data: &Path, state_dir: &Path) -> Result<()> {
    let session = filtered_session(matches, data, state_dir, SessionConfig::default())?;
    let output_dir = PathBuf::from(required(matches, "output")?);

    let document = session.export(Utc::now().date_naive())?;
    fs::create_dir_all(&output_dir).with_context(|| format!("无法创建输出目录 {}", output_dir.display()))?;
    let path = output_dir.join(&document.file_name);
    fs::write(&path, &document.content).with_context(|| format!("无法写入 {}", path.display()))?;

    println!("已导出 {} 道题目到 {}", document.count, path.display());
    Ok(())
}

fn pack(matches: &ArgMatches, data: &Path) -> Result<()> {
    let output = PathBuf::from(required(matches, "output")?);
    let start_time = std::time::Instant::now();

    let report = load_report(data)?;
    if report.catalog.is_empty() {
        bail!("数据集中没有有效题目");
    }
    for warning in report.warnings.iter().filter(|w| w.rejected()) {
        println!("跳过第 {} 条记录: {}", warning.position, warning.issue);
    }

    let bytes = report.catalog.to_snapshot()?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("无法创建目录 {}", parent.display()))?;
    }
    fs::write(&output, &bytes).with_context(|| format!("无法写入快照 {}", output.display()))?;

    println!(
        "已写入 {} 道题目到 {}（{} 字节，耗时 {:.2} 秒）",
        report.catalog.len(),
        output.display(),
        bytes.len(),
        start_time.elapsed().as_secs_f32()
    );
    Ok(())
}
