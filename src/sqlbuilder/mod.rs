pub mod sqlbuild;
