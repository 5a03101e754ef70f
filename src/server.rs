//! The oracle is queried over TCP with one request per line and receives one response line
//! per request:
//!
//! | request          | response                                                      |
//! |------------------|---------------------------------------------------------------|
//! | `word <w>`       | `true` or `false`                                             |
//! | `check [<file>]` | `equivalent`, `<witness> <side>` or `error <message>`         |
//! | anything else    | `unknown request`                                             |
//!
//! The side of a witness is `1` if only the target language contains it and `0` if only the
//! hypothesis accepts it.

use std::{
    fmt::Display,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use tracing::{debug, info, warn};

use crate::{synthesize, Counterexample, ObservationTable, Oracle, TableError, Word};

/// Where the server listens and which table `check` reads when no file is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The address to bind.
    pub addr: SocketAddr,
    /// Table file used by a bare `check`.
    pub default_table: PathBuf,
}

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `word <w>`, only the first token after the command is kept, unparsed.
    Membership(String),
    /// `check [<file>]`.
    Equivalence(Option<PathBuf>),
    /// Anything else.
    Unknown,
}

impl Request {
    /// Parses a single line, surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };
        match command {
            "word" => {
                let word = argument.split_whitespace().next().unwrap_or_default();
                Request::Membership(word.to_string())
            }
            "check" if argument.is_empty() => Request::Equivalence(None),
            "check" => Request::Equivalence(Some(PathBuf::from(argument))),
            _ => Request::Unknown,
        }
    }
}

/// The answer to a [`Request`], its [`Display`] implementation yields the response line
/// without the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Result of a membership query.
    Membership(bool),
    /// The hypothesis is correct.
    Equivalent,
    /// The hypothesis is wrong on the given word.
    Counterexample(Counterexample),
    /// The hypothesis could not be built.
    Error(String),
    /// The request was not understood.
    Unknown,
}

impl Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Membership(output) => write!(f, "{}", output),
            Response::Equivalent => write!(f, "equivalent"),
            Response::Counterexample(Counterexample { word, output }) => {
                write!(f, "{} {}", word, u8::from(*output))
            }
            Response::Error(message) => write!(f, "error {}", message.replace('\n', " ")),
            Response::Unknown => write!(f, "unknown request"),
        }
    }
}

/// Answers membership and equivalence queries of learners connecting over TCP.
///
/// Each connection is handled by its own task, requests on one connection are answered in
/// order.
pub struct QueryServer<O> {
    oracle: Arc<O>,
    config: ServerConfig,
}

impl<O: Oracle + Send + Sync + 'static> QueryServer<O> {
    /// Creates a server answering with `oracle`.
    pub fn new(oracle: O, config: ServerConfig) -> Self {
        Self {
            oracle: Arc::new(oracle),
            config,
        }
    }

    /// The oracle queries are answered with.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Binds the configured address and serves connections until an error occurs.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.addr).await?;
        self.serve(listener).await
    }

    /// Serves connections accepted on `listener`. Failing connections are logged and dropped,
    /// the listener keeps accepting.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Could not accept connection: {}", e);
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            let oracle = Arc::clone(&self.oracle);
            let default_table = self.config.default_table.clone();
            tokio::spawn(async move {
                match handle_connection(&oracle, &default_table, stream).await {
                    Ok(()) => debug!("Connection from {} closed", peer),
                    Err(e) => warn!("Connection from {} failed: {}", peer, e),
                }
            });
        }
    }
}

async fn handle_connection<O: Oracle + Send + Sync + 'static>(
    oracle: &Arc<O>,
    default_table: &Path,
    mut stream: TcpStream,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let response = answer(oracle, default_table, Request::parse(&line)).await;
        debug!("{:?} -> {}", line, response);
        writer.write_all(format!("{}\n", response).as_bytes()).await?;
    }
    Ok(())
}

/// Computes the response to `request`. The table file of an equivalence query is read from
/// disk, the hypothesis is built and compared on the blocking thread pool.
pub async fn answer<O: Oracle + Send + Sync + 'static>(
    oracle: &Arc<O>,
    default_table: &Path,
    request: Request,
) -> Response {
    match request {
        Request::Membership(word) => {
            let output = match word.parse::<Word>() {
                Ok(word) => oracle.output(&word),
                Err(e) => {
                    debug!("Membership query for {:?}: {}", word, e);
                    false
                }
            };
            Response::Membership(output)
        }
        Request::Equivalence(path) => {
            let path = path.as_deref().unwrap_or(default_table);
            let input = match tokio::fs::read_to_string(path).await {
                Ok(input) => input,
                Err(source) => {
                    return failed(TableError::Io {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };
            let oracle = Arc::clone(oracle);
            match tokio::task::spawn_blocking(move || check(oracle.as_ref(), &input)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => failed(e),
                Err(e) => {
                    warn!("Equivalence query aborted: {}", e);
                    Response::Error(format!("equivalence query aborted: {}", e))
                }
            }
        }
        Request::Unknown => Response::Unknown,
    }
}

fn failed(error: TableError) -> Response {
    warn!("Equivalence query failed: {}", error);
    Response::Error(error.to_string())
}

fn check<O: Oracle>(oracle: &O, input: &str) -> Result<Response, TableError> {
    let table = ObservationTable::from_json(input)?;
    debug!("Read observation table\n{}", table);
    let hypothesis = synthesize(&table)?;

    Ok(match oracle.equivalence(&hypothesis) {
        Ok(()) => {
            info!("Hypothesis with {} states is correct", hypothesis.size());
            Response::Equivalent
        }
        Err(counterexample) => {
            info!("Returning counterexample {}", counterexample.word);
            Response::Counterexample(counterexample)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, path::PathBuf};

    use pretty_assertions::assert_eq;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
        net::{
            tcp::{OwnedReadHalf, OwnedWriteHalf},
            TcpListener, TcpStream,
        },
    };

    use super::{QueryServer, Request, Response, ServerConfig};
    use crate::{tests::single_a, Counterexample, DfaOracle, Word};

    // accepts exactly A, like `single_a`
    const CORRECT: &str = r#"{"table": "0 1  1 0  0 0", "pref": "ε", "dop_pref": "A B", "suff": "ε A"}"#;
    // merges ε and B, so it also accepts BA
    const MERGED: &str = r#"{"table": "0 1 0", "pref": "ε", "dop_pref": "L R", "suff": "ε"}"#;
    // accepts nothing
    const EMPTY: &str = r#"{"table": "0", "pref": "ε", "dop_pref": "", "suff": "ε"}"#;

    #[test]
    fn request_parsing() {
        assert_eq!(
            Request::parse("word AB"),
            Request::Membership("AB".to_string())
        );
        assert_eq!(Request::parse("word"), Request::Membership(String::new()));
        assert_eq!(
            Request::parse("word A B"),
            Request::Membership("A".to_string())
        );
        assert_eq!(Request::parse("check\r"), Request::Equivalence(None));
        assert_eq!(
            Request::parse("check  tables/a.json "),
            Request::Equivalence(Some(PathBuf::from("tables/a.json")))
        );
        assert_eq!(Request::parse(""), Request::Unknown);
        assert_eq!(Request::parse("words A"), Request::Unknown);
        assert_eq!(Request::parse("hello"), Request::Unknown);
    }

    #[test]
    fn response_lines() {
        assert_eq!(Response::Membership(true).to_string(), "true");
        assert_eq!(Response::Equivalent.to_string(), "equivalent");
        assert_eq!(
            Response::Counterexample(Counterexample {
                word: "BA".parse().unwrap(),
                output: false
            })
            .to_string(),
            "BA 0"
        );
        assert_eq!(
            Response::Counterexample(Counterexample {
                word: Word::epsilon(),
                output: true
            })
            .to_string(),
            "ε 1"
        );
        assert_eq!(
            Response::Error("two\nlines".to_string()).to_string(),
            "error two lines"
        );
        assert_eq!(Response::Unknown.to_string(), "unknown request");
    }

    struct Client {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl Client {
        async fn connect(addr: SocketAddr) -> Self {
            let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
            Self {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }

        async fn ask(&mut self, request: &str) -> String {
            self.writer
                .write_all(format!("{request}\n").as_bytes())
                .await
                .unwrap();
            self.lines.next_line().await.unwrap().unwrap()
        }
    }

    async fn start(default_table: PathBuf) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = QueryServer::new(
            DfaOracle::new(single_a()),
            ServerConfig {
                addr,
                default_table,
            },
        );
        tokio::spawn(async move { server.serve(listener).await });
        addr
    }

    #[tokio::test]
    async fn membership_queries() {
        let addr = start(PathBuf::from("learner.json")).await;
        let mut client = Client::connect(addr).await;
        assert_eq!(client.ask("word A").await, "true");
        assert_eq!(client.ask("word B").await, "false");
        assert_eq!(client.ask("word").await, "false");
        assert_eq!(client.ask("word AC").await, "false");
        assert_eq!(client.ask("word L").await, "true");
        assert_eq!(client.ask("word A B").await, "true");
        assert_eq!(client.ask("word B A").await, "false");
        assert_eq!(client.ask("what").await, "unknown request");
        assert_eq!(client.ask("").await, "unknown request");
    }

    #[tokio::test]
    async fn broken_tables_keep_the_connection_open() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        let huge = dir.path().join("huge.json");
        let tokens = vec!["A"; 5000].join(" ");
        std::fs::write(
            &huge,
            format!(r#"{{"table": "", "pref": "{tokens}", "suff": "{tokens}"}}"#),
        )
        .unwrap();

        let addr = start(dir.path().join("missing.json")).await;
        let mut client = Client::connect(addr).await;
        assert!(client.ask("check").await.starts_with("error "));
        assert!(client
            .ask("check /definitely/not/here.json")
            .await
            .starts_with("error "));
        assert!(client
            .ask(&format!("check {}", garbage.display()))
            .await
            .starts_with("error "));
        assert!(client
            .ask(&format!("check {}", huge.display()))
            .await
            .starts_with("error malformed table: table has too many cells"));
        assert_eq!(client.ask("word A").await, "true");
    }

    #[tokio::test]
    async fn equivalence_queries() {
        let dir = tempfile::tempdir().unwrap();
        let default_table = dir.path().join("learner.json");
        std::fs::write(&default_table, CORRECT).unwrap();
        let merged = dir.path().join("merged.json");
        std::fs::write(&merged, MERGED).unwrap();
        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, EMPTY).unwrap();

        let addr = start(default_table).await;
        let mut client = Client::connect(addr).await;
        assert_eq!(client.ask("check").await, "equivalent");
        assert_eq!(
            client.ask(&format!("check {}", merged.display())).await,
            "BA 0"
        );
        assert_eq!(
            client.ask(&format!("check {}", empty.display())).await,
            "A 1"
        );
    }

    #[tokio::test]
    async fn connections_are_independent() {
        let addr = start(PathBuf::from("learner.json")).await;
        let mut first = Client::connect(addr).await;
        let mut second = Client::connect(addr).await;
        assert_eq!(second.ask("word A").await, "true");
        assert_eq!(first.ask("word AA").await, "false");
        drop(second);
        assert_eq!(first.ask("word A").await, "true");
    }
}
