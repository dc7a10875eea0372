use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spfs::{FileSystem, LocalClientFactory, SharePointStorage, StorageConfig};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "SharePoint 文档库文件系统工具", long_about = None)]
struct Args {
    /// JSON 配置文件（host / documentLibrary / user / password / cacheCapacity）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 远端主机，覆盖配置文件
    #[arg(long)]
    host: Option<String>,

    /// 文档库名称，覆盖配置文件
    #[arg(short, long)]
    library: Option<String>,

    /// 用户名，覆盖配置文件
    #[arg(short, long)]
    user: Option<String>,

    /// 密码，覆盖配置文件
    #[arg(short, long)]
    password: Option<String>,

    /// 本地文档库根目录
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 显示存储标识
    Id,
    /// 列出目录
    Ls {
        #[arg(default_value = "")]
        path: String,
    },
    /// 显示大小和修改时间
    Stat { path: String },
    /// 显示类型（file / dir）
    Type { path: String },
    /// 检查是否存在
    Exists { path: String },
    /// 创建目录
    Mkdir { path: String },
    /// 删除文件或目录
    Rm { path: String },
    /// 删除目录（远端未实现）
    Rmdir { path: String },
    /// 设置修改时间（远端未实现）
    Touch { path: String },
}

fn load_config(args: &Args) -> Result<StorageConfig> {
    let base = match &args.config {
        Some(path) => StorageConfig::from_json_file(path)
            .with_context(|| format!("加载配置失败: {:?}", path))?,
        None => {
            let Some(library) = args.library.clone() else {
                bail!("必须提供 --config 或 --library");
            };
            StorageConfig::new(args.host.clone().unwrap_or_default(), library, None, None)
        }
    };

    let mut config = base;
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(library) = &args.library {
        config.document_library = library.clone();
    }
    if args.user.is_some() {
        config.user = args.user.clone();
    }
    if args.password.is_some() {
        config.password = args.password.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 初始化日志系统
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        "初始化存储: host={}, 文档库={}, 本地根目录={:?}",
        config.host, config.document_library, args.root
    );

    let factory = LocalClientFactory::new(args.root.clone());
    let storage = SharePointStorage::new(config, &factory).context("创建存储失败")?;

    match &args.command {
        Command::Id => println!("{}", storage.id()),
        Command::Ls { path } => {
            for name in storage.list_directory(path).await? {
                println!("{}", name);
            }
        }
        Command::Stat { path } => match storage.stat(path).await {
            Some(stat) => {
                println!("size:  {}", stat.size);
                println!("mtime: {}", stat.mtime.to_rfc3339());
                println!("atime: {}", stat.atime.to_rfc3339());
            }
            None => bail!("无法获取状态: {}", path),
        },
        Command::Type { path } => match storage.file_type(path).await {
            Some(kind) => println!("{}", kind),
            None => bail!("文件不存在: {}", path),
        },
        Command::Exists { path } => {
            let exists = storage.exists(path).await;
            println!("{}", exists);
            if !exists {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Mkdir { path } => {
            if !storage.create_directory(path).await {
                bail!("创建目录失败: {}", path);
            }
        }
        Command::Rm { path } => {
            if !storage.delete(path).await {
                bail!("删除失败: {}", path);
            }
        }
        Command::Rmdir { path } => {
            if !storage.remove_directory(path).await {
                bail!("删除目录失败: {}", path);
            }
        }
        Command::Touch { path } => {
            if !storage.set_modification_time(path, None).await {
                bail!("设置修改时间失败: {}", path);
            }
        }
    }

    debug!("{}: {}", storage.library(), storage.cache_stats());
    Ok(ExitCode::SUCCESS)
}
