//! Line-oriented command grammar.
//!
//! Each line is a keyword followed by a fixed number of whitespace-separated
//! parameters. The parameter count is validated before any value is parsed.

use parkade::SlotNumber;

pub const CREATE_PARKING_LOT: &str = "create_parking_lot";
pub const PARK: &str = "park";
pub const LEAVE: &str = "leave";
pub const STATUS: &str = "status";
pub const REG_NUMBERS_FOR_COLOR: &str = "registration_numbers_for_cars_with_color";
pub const SLOT_NUMBERS_FOR_COLOR: &str = "slot_numbers_for_cars_with_color";
pub const SLOT_NUMBER_FOR_REG_NUMBER: &str = "slot_number_for_registration_number";

/// Keyword and expected parameter count.
pub const COMMANDS: &[(&str, usize)] = &[
    (CREATE_PARKING_LOT, 1),
    (PARK, 2),
    (LEAVE, 1),
    (STATUS, 0),
    (REG_NUMBERS_FOR_COLOR, 1),
    (SLOT_NUMBERS_FOR_COLOR, 1),
    (SLOT_NUMBER_FOR_REG_NUMBER, 1),
];

pub const COMMAND_HELP: &str = "\
--------------Please Enter one of the below commands. {variable} to be replaced -----------------------
A) For creating parking lot of size n               ---> create_parking_lot {capacity}
B) To park a car                                    ---> park <<car_number>> {car_clour}
C) Remove(Unpark) car from parking                  ---> leave {slot_number}
D) Print status of parking slot                     ---> status
E) Get cars registration no for the given car color ---> registration_numbers_for_cars_with_color {car_color}
F) Get slot numbers for the given car color         ---> slot_numbers_for_cars_with_color {car_color}
G) Get slot number for the given car number         ---> slot_number_for_registration_number {car_number}";

pub fn expected_params(keyword: &str) -> Option<usize> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, params)| *params)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{keyword}' expects {expected} parameter(s), got {got}")]
    Arity {
        keyword: String,
        expected: usize,
        got: usize,
    },

    #[error("{name} value is incorrect")]
    InvalidValue { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateParkingLot { capacity: u32 },
    Park { registration_no: String, color: String },
    Leave { slot: SlotNumber },
    Status,
    RegistrationNumbersForColor { color: String },
    SlotNumbersForColor { color: String },
    SlotNumberForRegistration { registration_no: String },
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().ok_or(CommandError::Empty)?;
        let params: Vec<&str> = tokens.collect();

        let expected =
            expected_params(keyword).ok_or_else(|| CommandError::Unknown(keyword.to_string()))?;
        if params.len() != expected {
            return Err(CommandError::Arity {
                keyword: keyword.to_string(),
                expected,
                got: params.len(),
            });
        }

        let command = match keyword {
            CREATE_PARKING_LOT => Command::CreateParkingLot {
                capacity: parse_number(params[0], "capacity")?,
            },
            PARK => Command::Park {
                registration_no: params[0].to_string(),
                color: params[1].to_string(),
            },
            LEAVE => Command::Leave {
                slot: parse_number(params[0], "slot_number")?,
            },
            STATUS => Command::Status,
            REG_NUMBERS_FOR_COLOR => Command::RegistrationNumbersForColor {
                color: params[0].to_string(),
            },
            SLOT_NUMBERS_FOR_COLOR => Command::SlotNumbersForColor {
                color: params[0].to_string(),
            },
            SLOT_NUMBER_FOR_REG_NUMBER => Command::SlotNumberForRegistration {
                registration_no: params[0].to_string(),
            },
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Command::CreateParkingLot { .. } => CREATE_PARKING_LOT,
            Command::Park { .. } => PARK,
            Command::Leave { .. } => LEAVE,
            Command::Status => STATUS,
            Command::RegistrationNumbersForColor { .. } => REG_NUMBERS_FOR_COLOR,
            Command::SlotNumbersForColor { .. } => SLOT_NUMBERS_FOR_COLOR,
            Command::SlotNumberForRegistration { .. } => SLOT_NUMBER_FOR_REG_NUMBER,
        }
    }
}

fn parse_number(token: &str, name: &'static str) -> Result<u32, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidValue { name })
}
