use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeStep {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug)]
pub struct TimeStepParseError(String);

impl fmt::Display for TimeStepParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid time step: {}", self.0)
    }
}

impl std::error::Error for TimeStepParseError {}

impl FromStr for TimeStep {
    type Err = TimeStepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(TimeStep::Daily),
            "weekly" | "w" => Ok(TimeStep::Weekly),
            "monthly" | "m" => Ok(TimeStep::Monthly),
            other => Err(TimeStepParseError(other.to_string())),
        }
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeStep::Daily => write!(f, "daily"),
            TimeStep::Weekly => write!(f, "weekly"),
            TimeStep::Monthly => write!(f, "monthly"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_step() {
        assert_eq!("daily".parse::<TimeStep>().unwrap(), TimeStep::Daily);
        assert_eq!("W".parse::<TimeStep>().unwrap(), TimeStep::Weekly);
        assert_eq!(" monthly ".parse::<TimeStep>().unwrap(), TimeStep::Monthly);
        assert!("hourly".parse::<TimeStep>().is_err());
    }
}
