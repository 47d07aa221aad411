mod datatypes_testing;
