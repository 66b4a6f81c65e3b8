//! Terminal front end.
//!
//! One invocation navigates to one screen, performs one action and renders
//! the result as text. Screen output goes to stdout; blocking notices,
//! confirmations and the guard placeholder go to stderr; answers to
//! confirmations are read from stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::api::{ApiClient, ApiError, Doctors, Patients};
use crate::auth::{self, LoginForm};
use crate::config::{ClientConfig, ConfigError, SESSION_FILE_NAME};
use crate::guard::{Resolution, Route, RouteGuard, Shell, LOGOUT_LABEL};
use crate::models::{
    display_timestamp, DoctorForm, LocalPrescription, LocalStats, MedicationItem, Origin,
    OriginFilter, PatientForm, Prescription, Sex,
};
use crate::screens::doctors::DoctorsScreen;
use crate::screens::patients::PatientsScreen;
use crate::screens::{
    Composer, Confirm, EntityKind, EntityScreen, LocalPrescriptionsScreen, Notice,
    PrescriptionsScreen, RowAction, ScreenError,
};
use crate::session::{SessionError, SessionStore};

// ═══════════════════════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "recetas-admin")]
#[command(version)]
#[command(about = "Administración de pacientes, médicos y recetas")]
pub struct CliArgs {
    /// Backend base URL (overrides RECETAS_API_BASE)
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,
    /// Directory holding the session token (overrides RECETAS_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    /// Where downloaded PDFs are written (overrides RECETAS_DOWNLOAD_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long, env = "RECETAS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the navigation menu
    Menu,
    /// Patients
    Patients {
        #[command(subcommand)]
        action: PatientAction,
    },
    /// Doctors
    Doctors {
        #[command(subcommand)]
        action: DoctorAction,
    },
    /// Compose and submit a new prescription
    Compose(ComposeArgs),
    /// Prescriptions sent from the web
    Prescriptions {
        #[command(subcommand)]
        action: PrescriptionAction,
    },
    /// Locally processed prescriptions and PDFs
    Local {
        #[command(subcommand)]
        action: LocalAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PatientAction {
    List,
    Show { id: String },
    Create(PatientArgs),
    /// Export every patient as XML
    Export,
    /// Import patients from the drop folder
    Import,
}

#[derive(Args, Debug)]
pub struct PatientArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long = "nombre")]
    pub name: String,
    #[arg(long = "apellido")]
    pub surname: String,
    #[arg(long = "fecha-nacimiento", value_name = "YYYY-MM-DD", default_value = "")]
    pub birth_date: String,
    /// M, F or O
    #[arg(long = "sexo")]
    pub sex: Option<Sex>,
    #[arg(long = "telefono", default_value = "")]
    pub phone: String,
    #[arg(long = "correo", default_value = "")]
    pub email: String,
}

impl From<PatientArgs> for PatientForm {
    fn from(args: PatientArgs) -> Self {
        PatientForm {
            id: args.id,
            name: args.name,
            surname: args.surname,
            birth_date: args.birth_date,
            sex: args.sex,
            phone: args.phone,
            email: args.email,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum DoctorAction {
    List,
    Show { id: String },
    Create(DoctorArgs),
    /// Export every doctor as XML
    Export,
    /// Import doctors from the drop folder
    Import,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long = "nombre")]
    pub name: String,
    #[arg(long = "cedula", default_value = "")]
    pub license: String,
    #[arg(long = "correo", default_value = "")]
    pub email: String,
}

impl From<DoctorArgs> for DoctorForm {
    fn from(args: DoctorArgs) -> Self {
        DoctorForm {
            id: args.id,
            name: args.name,
            license: args.license,
            email: args.email,
        }
    }
}

#[derive(Args, Debug)]
pub struct ComposeArgs {
    #[arg(long = "paciente")]
    pub patient: String,
    #[arg(long = "medico")]
    pub doctor: String,
    #[arg(long = "diagnostico", default_value = "")]
    pub diagnosis: String,
    #[arg(long = "indicaciones", default_value = "")]
    pub instructions: String,
    /// `nombre;dosis;frecuencia;duracion`, repeatable
    #[arg(long = "med", value_name = "MEDICAMENTO", value_parser = parse_medication)]
    pub medications: Vec<MedicationItem>,
}

#[derive(Subcommand, Debug)]
pub enum PrescriptionAction {
    List,
    /// Download the PDF of a prescription
    Pdf { id_receta: String },
    /// Retry delivery of every unsent prescription
    Retry,
    /// Resend the notification e-mail
    Resend { id_receta: String },
}

#[derive(Subcommand, Debug)]
pub enum LocalAction {
    List {
        /// all, drive or local
        #[arg(long = "origen", default_value = "all")]
        origin: OriginFilter,
    },
    Show { id_receta: String },
    Pdf { id_receta: String },
    Delete {
        id_receta: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[arg(long = "origen", default_value = "all")]
        origin: OriginFilter,
    },
    /// Force a synchronization with Drive
    Sync {
        #[arg(short, long)]
        yes: bool,
        #[arg(long = "origen", default_value = "all")]
        origin: OriginFilter,
    },
}

/// `nombre;dosis;frecuencia;duracion`; trailing parts may be omitted.
pub fn parse_medication(raw: &str) -> Result<MedicationItem, String> {
    let mut parts = raw.split(';').map(|p| p.trim().to_string());
    let item = MedicationItem {
        name: parts.next().unwrap_or_default(),
        dose: parts.next().unwrap_or_default(),
        frequency: parts.next().unwrap_or_default(),
        duration: parts.next().unwrap_or_default(),
    };
    if parts.next().is_some() {
        return Err(format!("demasiados campos en {raw:?} (nombre;dosis;frecuencia;duracion)"));
    }
    Ok(item)
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Client(#[from] ApiError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
    #[error("Sesión no iniciada. Ejecute `recetas-admin login`.")]
    NotAuthenticated,
    #[error("Error de terminal: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Backend rejected the stored token.
    pub fn is_stale_session(&self) -> bool {
        match self {
            CliError::Screen(e) => e.api_error().is_some_and(ApiError::is_unauthorized),
            CliError::Client(e) => e.is_unauthorized(),
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Terminal
// ═══════════════════════════════════════════════════════════

/// Input for confirmations, stdout for screens, stderr for modals.
pub struct Terminal<I, O, E> {
    input: I,
    out: O,
    err: E,
}

impl Terminal<io::StdinLock<'static>, io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<I: BufRead, O: Write, E: Write> Terminal<I, O, E> {
    pub fn new(input: I, out: O, err: E) -> Self {
        Self { input, out, err }
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn errors(&self) -> &E {
        &self.err
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Blocking message.
    fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        writeln!(self.err, "{notice}")
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.err, "{prompt}")?;
        self.err.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<I: BufRead, O: Write, E: Write> Confirm for Terminal<I, O, E> {
    fn confirm(&mut self, question: &str) -> bool {
        match self.read_line(&format!("{question} [s/N] ")) {
            Ok(answer) => matches!(
                answer.trim().to_lowercase().as_str(),
                "s" | "si" | "sí" | "y" | "yes"
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                false
            }
        }
    }
}

/// Yes to every prompt (`--yes`).
struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════

struct Context {
    config: ClientConfig,
    session: Arc<SessionStore>,
    client: ApiClient,
}

impl Context {
    fn open(args: &CliArgs) -> Result<Self, CliError> {
        let mut config = ClientConfig::from_env();
        if let Some(base) = &args.api_base {
            config = config.with_api_base(base);
        }
        if let Some(dir) = &args.data_dir {
            config.session_path = dir.join(SESSION_FILE_NAME);
        }
        if let Some(dir) = &args.download_dir {
            config.download_dir = dir.clone();
        }
        Self::with_config(config)
    }

    fn with_config(config: ClientConfig) -> Result<Self, CliError> {
        config.validate()?;
        let session = Arc::new(SessionStore::open_file(&config.session_path)?);
        let client = ApiClient::new(&config.api_base, session.clone())?;
        Ok(Self {
            config,
            session,
            client,
        })
    }
}

fn route_of(command: &Command) -> Route {
    match command {
        Command::Login { .. } | Command::Logout => Route::Login,
        Command::Menu | Command::Compose(_) => Route::Composer,
        Command::Patients { .. } => Route::Patients,
        Command::Doctors { .. } => Route::Doctors,
        Command::Prescriptions { .. } => Route::PrescriptionList,
        Command::Local { .. } => Route::LocalPrescriptions,
    }
}

/// Parse arguments from the process and run one command.
pub async fn run_from_env() -> Result<(), CliError> {
    let args = CliArgs::parse();
    let ctx = Context::open(&args)?;
    let mut term = Terminal::stdio();
    dispatch(&ctx, args.command, &mut term).await
}

async fn dispatch<I: BufRead, O: Write, E: Write>(
    ctx: &Context,
    command: Command,
    term: &mut Terminal<I, O, E>,
) -> Result<(), CliError> {
    let mut guard = RouteGuard::new(ctx.session.clone(), route_of(&command));
    let mut placeholder = |text: &str| {
        if let Err(e) = writeln!(term.err, "{text}") {
            tracing::debug!(error = %e, "Placeholder not shown");
        }
    };
    match guard.mount(&mut placeholder) {
        Resolution::Redirect(_) => return Err(CliError::NotAuthenticated),
        Resolution::Loading | Resolution::Render(_) => {}
    }

    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => term.read_line("Contraseña: ")?,
            };
            let form = LoginForm::new(username, password);
            let route = auth::login(&ctx.client, &form).await?;
            term.notice(&Notice::new(format!("Sesión iniciada. Inicio: {route}")))?;
        }
        Command::Logout => {
            let mut shell = Shell::new(ctx.session.clone(), Route::Login);
            shell.logout()?;
            term.notice(&Notice::new("Sesión cerrada"))?;
        }
        Command::Menu => {
            let shell = Shell::new(ctx.session.clone(), Route::default());
            for item in shell.nav_items() {
                let marker = if item.route == shell.current() { "*" } else { " " };
                term.line(&format!("{marker} {:<26} {}", item.label, item.route))?;
            }
            term.line(&format!("  {LOGOUT_LABEL:<26} recetas-admin logout"))?;
        }
        Command::Patients { action } => {
            let op: EntityOp<PatientForm> = match action {
                PatientAction::List => EntityOp::List,
                PatientAction::Show { id } => EntityOp::Show(id),
                PatientAction::Create(args) => EntityOp::Create(args.into()),
                PatientAction::Export => EntityOp::Export,
                PatientAction::Import => EntityOp::Import,
            };
            let mut screen = PatientsScreen::new(ctx.client.clone());
            run_entity::<Patients, _, _, _>(&mut screen, op, term).await?;
        }
        Command::Doctors { action } => {
            let op: EntityOp<DoctorForm> = match action {
                DoctorAction::List => EntityOp::List,
                DoctorAction::Show { id } => EntityOp::Show(id),
                DoctorAction::Create(args) => EntityOp::Create(args.into()),
                DoctorAction::Export => EntityOp::Export,
                DoctorAction::Import => EntityOp::Import,
            };
            let mut screen = DoctorsScreen::new(ctx.client.clone());
            run_entity::<Doctors, _, _, _>(&mut screen, op, term).await?;
        }
        Command::Compose(args) => run_compose(ctx, args, term).await?,
        Command::Prescriptions { action } => run_prescriptions(ctx, action, term).await?,
        Command::Local { action } => run_local(ctx, action, term).await?,
    }
    Ok(())
}

enum EntityOp<F> {
    List,
    Show(String),
    Create(F),
    Export,
    Import,
}

async fn run_entity<K, I, O, E>(
    screen: &mut EntityScreen<K>,
    op: EntityOp<K::Form>,
    term: &mut Terminal<I, O, E>,
) -> Result<(), CliError>
where
    K: EntityKind,
    I: BufRead,
    O: Write,
    E: Write,
{
    match op {
        EntityOp::List => {
            screen.load().await?;
            if screen.rows().is_empty() {
                term.line("Sin registros")?;
            }
            for row in screen.rows() {
                term.line(&K::describe(row))?;
            }
        }
        EntityOp::Show(id) => {
            let record = screen.fetch(&id).await?;
            let json = serde_json::to_value(&record).map_err(|e| ApiError::Decode(e.to_string()))?;
            term.line(&crate::models::pretty(&json))?;
        }
        EntityOp::Create(form) => {
            *screen.form_mut() = form;
            let notice = screen.create().await?;
            term.notice(&notice)?;
        }
        EntityOp::Export => {
            let notice = screen.export().await?;
            term.notice(&notice)?;
        }
        EntityOp::Import => {
            let notice = screen.import().await?;
            term.notice(&notice)?;
        }
    }
    Ok(())
}

async fn run_compose<I: BufRead, O: Write, E: Write>(
    ctx: &Context,
    args: ComposeArgs,
    term: &mut Terminal<I, O, E>,
) -> Result<(), CliError> {
    let mut composer = Composer::new(ctx.client.clone());
    composer.load_options().await;

    let patient_known =
        composer.patients().is_empty() || composer.patients().iter().any(|p| p.id == args.patient);
    if patient_known {
        composer.draft_mut().select_patient(&args.patient);
    }
    if !args.doctor.trim().is_empty() && composer.draft().patient_id().is_some() {
        composer.select_doctor_by_id(&args.doctor)?;
    }

    let draft = composer.draft_mut();
    draft.diagnosis = args.diagnosis;
    draft.instructions = args.instructions;
    for (index, item) in args.medications.into_iter().enumerate() {
        if index > 0 {
            draft.add_medication();
        }
        if let Some(slot) = draft.medication_mut(index) {
            *slot = item;
        }
    }

    let notice = composer.submit().await?;
    term.notice(&notice)?;
    Ok(())
}

async fn run_prescriptions<I: BufRead, O: Write, E: Write>(
    ctx: &Context,
    action: PrescriptionAction,
    term: &mut Terminal<I, O, E>,
) -> Result<(), CliError> {
    let mut screen = PrescriptionsScreen::new(ctx.client.clone(), ctx.config.download_dir.clone());
    match action {
        PrescriptionAction::List => {
            screen.load().await;
            if screen.rows().is_empty() {
                term.line("No hay recetas registradas")?;
            }
            for row in screen.rows() {
                let actions = screen.actions_for(&row.id_receta);
                for line in render_prescription(row, &actions) {
                    term.line(&line)?;
                }
                term.line("")?;
            }
        }
        PrescriptionAction::Pdf { id_receta } => {
            screen.load().await;
            let path = screen.open_document(&id_receta).await?;
            term.notice(&Notice::new(format!("PDF guardado en {}", path.display())))?;
        }
        PrescriptionAction::Retry => {
            let notice = screen.retry_delivery().await?;
            term.notice(&notice)?;
        }
        PrescriptionAction::Resend { id_receta } => {
            screen.load().await;
            let notice = screen.resend_notification(&id_receta).await?;
            term.notice(&notice)?;
        }
    }
    Ok(())
}

async fn run_local<I: BufRead, O: Write, E: Write>(
    ctx: &Context,
    action: LocalAction,
    term: &mut Terminal<I, O, E>,
) -> Result<(), CliError> {
    let mut screen = LocalPrescriptionsScreen::new(ctx.client.clone(), &ctx.config);
    match action {
        LocalAction::List { origin } => {
            screen.load(origin).await?;
            render_local_screen(&screen, term)?;
        }
        LocalAction::Show { id_receta } => {
            screen.load(OriginFilter::All).await?;
            let row = match screen.show_detail(&id_receta) {
                Some(row) => row.clone(),
                None => screen.fetch_detail(&id_receta).await?,
            };
            for line in render_local_detail(&row) {
                term.line(&line)?;
            }
        }
        LocalAction::Pdf { id_receta } => {
            let path = screen.download(&id_receta).await?;
            term.notice(&Notice::new(format!("PDF guardado en {}", path.display())))?;
        }
        LocalAction::Delete {
            id_receta,
            yes,
            origin,
        } => {
            screen.load(origin).await?;
            let outcome = if yes {
                screen.delete(&id_receta, &mut AssumeYes).await?
            } else {
                screen.delete(&id_receta, term).await?
            };
            if let Some(notice) = outcome {
                term.notice(&notice)?;
                render_local_screen(&screen, term)?;
            }
        }
        LocalAction::Sync { yes, origin } => {
            screen.load(origin).await?;
            let outcome = if yes {
                screen.force_sync(&mut AssumeYes).await?
            } else {
                screen.force_sync(term).await?
            };
            if let Some(notice) = outcome {
                term.notice(&notice)?;
                if screen.settle_pending().await {
                    render_local_screen(&screen, term)?;
                }
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

fn render_prescription(row: &Prescription, actions: &[RowAction]) -> Vec<String> {
    let status = if row.sent { "Enviada" } else { "Pendiente" };
    let mut header = format!("Receta #{} [{status}]", row.id_receta);
    if row.has_document() {
        header.push_str(" [PDF disponible]");
    }

    let mut lines = vec![
        header,
        format!("  Paciente ID: {}", row.patient_id.as_deref().unwrap_or("-")),
        format!("  Médico ID: {}", row.doctor_id.as_deref().unwrap_or("-")),
    ];
    if let Some(diagnosis) = row.diagnosis.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("  Diagnóstico: {diagnosis}"));
    }
    if !row.medications.is_empty() {
        lines.push("  Medicamentos:".into());
        lines.extend(row.medications.iter().map(|m| format!("    • {}", m.summary())));
    }
    if let Some(issued) = row.issued_at.as_deref() {
        lines.push(format!("  Fecha de emisión: {}", display_timestamp(issued)));
    }
    if let Some(created) = row.created_at.as_deref() {
        lines.push(format!("  Creada: {}", display_timestamp(created)));
    }
    let labels: Vec<&str> = actions.iter().map(RowAction::label).collect();
    lines.push(format!("  Acciones: {}", labels.join(", ")));
    lines
}

fn render_stats(stats: &LocalStats) -> String {
    format!(
        "Total Recetas: {} | Con PDF: {} | Desde Drive: {}",
        stats.total,
        stats.with_document,
        stats.count_for(&Origin::Drive)
    )
}

fn render_local_row(row: &LocalPrescription) -> String {
    format!(
        "{:<15} {:<10} {:<10} {:<6} {:<16} {}",
        row.short_id(),
        row.patient_id.as_deref().unwrap_or("-"),
        row.doctor_id.as_deref().unwrap_or("-"),
        row.origin.as_ref().map(Origin::as_str).unwrap_or("-"),
        row.issued_at.as_deref().map(display_timestamp).unwrap_or_default(),
        if row.has_document() { "✓ PDF" } else { "✗ Sin PDF" },
    )
}

fn render_local_screen<I: BufRead, O: Write, E: Write>(
    screen: &LocalPrescriptionsScreen,
    term: &mut Terminal<I, O, E>,
) -> io::Result<()> {
    term.line(&render_stats(screen.stats()))?;
    term.line(&format!("Filtro: {}", screen.filter()))?;
    if screen.rows().is_empty() {
        return term.line("No hay recetas");
    }
    for row in screen.rows() {
        term.line(&render_local_row(row))?;
    }
    Ok(())
}

fn render_local_detail(row: &LocalPrescription) -> Vec<String> {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".into());
    vec![
        format!("ID Receta: {}", row.id_receta),
        format!("Paciente: {}", field(&row.patient_id)),
        format!("Médico: {}", field(&row.doctor_id)),
        format!("Diagnóstico: {}", field(&row.diagnosis)),
        format!("Indicaciones: {}", field(&row.instructions)),
        format!(
            "Origen: {}",
            row.origin.as_ref().map(Origin::as_str).unwrap_or("-")
        ),
        format!(
            "Fecha de emisión: {}",
            row.issued_at.as_deref().map(display_timestamp).unwrap_or_else(|| "-".into())
        ),
        format!("XML: {}", field(&row.xml_path)),
        format!("PDF: {}", field(&row.pdf_path)),
        format!("Checksum: {}", field(&row.checksum)),
    ]
}
