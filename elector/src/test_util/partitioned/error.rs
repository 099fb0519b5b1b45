use std::{error, fmt};

#[derive(Debug, Eq, PartialEq)]
pub enum HandleError {
    TransportDropped,
    UnknownRoute,
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleError::TransportDropped => write!(f, "transport has been dropped"),
            HandleError::UnknownRoute => write!(f, "no route between the given nodes"),
        }
    }
}

impl error::Error for HandleError {}
